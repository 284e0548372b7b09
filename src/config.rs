// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tool configuration.
//!
//! Read from `flashlang.yaml` in the working directory, or from the file
//! given with `--config`. `FLASHLANG_LANG` overrides the default language;
//! command-line flags override both.
//!
//! ```yaml
//! default_language: de
//! fallback_language: cs
//! bucket_bits: 6
//! ```

use crate::lang::LangCode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "flashlang.yaml";
pub const LANG_ENV: &str = "FLASHLANG_LANG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Language `lookup` translates into when `--lang` is not given.
    pub default_language: Option<LangCode>,
    /// Language consulted when the active one has no text.
    pub fallback_language: Option<LangCode>,
    /// Bucket sizing for `build`; automatic when unset.
    pub bucket_bits: Option<u8>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env(env::var(LANG_ENV).ok().as_deref())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let language = value
                .parse()
                .with_context(|| format!("{LANG_ENV}={value}"))?;
            self.default_language = Some(language);
        }
        Ok(())
    }
}
