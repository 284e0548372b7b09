// SPDX-License-Identifier: PMPL-1.0-or-later

//! The process-wide translator used by GUI code.
//!
//! Startup builds the registry, wraps it in a [`Translator`] and calls
//! [`install`] exactly once, before any worker or GUI task runs. After that
//! the free functions below are all a widget needs. Before installation they
//! degrade to showing source text.

use crate::error::{LookupError, RegistryError};
use crate::lang::LangCode;
use crate::translator::Translator;
use std::sync::OnceLock;
use tracing::info;

static TRANSLATOR: OnceLock<Translator<'static>> = OnceLock::new();

/// Publish the translator. A second call fails and leaves the first in place.
pub fn install(translator: Translator<'static>) -> Result<&'static Translator<'static>, RegistryError> {
    let mut fresh = false;
    let installed = TRANSLATOR.get_or_init(|| {
        fresh = true;
        translator
    });
    if !fresh {
        return Err(RegistryError::AlreadyInstalled);
    }
    info!(
        languages = installed.registry().len(),
        "translation tables installed"
    );
    Ok(installed)
}

pub fn installed() -> Option<&'static Translator<'static>> {
    TRANSLATOR.get()
}

/// Display text for `source` in the active language.
pub fn translate(source: &str) -> &str {
    match TRANSLATOR.get() {
        Some(translator) => translator.translate(source),
        None => source,
    }
}

pub fn set_active_language(language: LangCode) -> Result<(), LookupError> {
    TRANSLATOR
        .get()
        .ok_or(LookupError::UnknownLanguage(language))?
        .set_active_language(language)
}

pub fn active_language() -> Option<LangCode> {
    TRANSLATOR.get()?.active_language()
}

/// Languages the language menu can offer.
pub fn supported_languages() -> impl Iterator<Item = LangCode> {
    TRANSLATOR
        .get()
        .into_iter()
        .flat_map(|translator| translator.registry().supported_languages())
}
