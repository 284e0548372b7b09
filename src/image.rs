// SPDX-License-Identifier: PMPL-1.0-or-later

//! Owned, serializable translation tables.
//!
//! A table image is what `flashlang build` writes and every other command
//! reads: the shared index, the source strings in index order, and one
//! offset table plus blob per language. It is stored as JSON tagged with a
//! schema name and version, and carries the BLAKE3 digest of its index so a
//! hand-edited or mismatched image is refused on load.

use crate::blob::StringBlob;
use crate::error::{RegistryError, TableError};
use crate::index::{BucketRange, HashIndex, Record};
use crate::lang::LangCode;
use crate::provider::Provider;
use crate::registry::Registry;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const IMAGE_SCHEMA: &str = "flashlang.table-image";
pub const IMAGE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableImage {
    pub schema: String,
    pub version: u32,
    pub index_digest: String,
    pub buckets: Vec<BucketRange>,
    pub records: Vec<Record>,
    /// Source strings by string index. Only tooling reads these.
    #[serde(default)]
    pub sources: Vec<String>,
    pub languages: Vec<LanguageImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageImage {
    pub code: LangCode,
    pub offsets: Vec<u16>,
    pub raw: Vec<u8>,
}

impl LanguageImage {
    pub fn blob(&self) -> StringBlob<'_> {
        StringBlob::new(&self.offsets, &self.raw)
    }
}

impl TableImage {
    pub fn new(
        buckets: Vec<BucketRange>,
        records: Vec<Record>,
        sources: Vec<String>,
        languages: Vec<LanguageImage>,
    ) -> Self {
        let index_digest = HashIndex::new(&buckets, &records).digest();
        Self {
            schema: IMAGE_SCHEMA.to_string(),
            version: IMAGE_VERSION,
            index_digest,
            buckets,
            records,
            sources,
            languages,
        }
    }

    pub fn index(&self) -> HashIndex<'_> {
        HashIndex::new(&self.buckets, &self.records)
    }

    pub fn languages(&self) -> impl Iterator<Item = LangCode> + '_ {
        self.languages.iter().map(|language| language.code)
    }

    pub fn blob(&self, code: LangCode) -> Option<StringBlob<'_>> {
        self.languages
            .iter()
            .find(|language| language.code == code)
            .map(LanguageImage::blob)
    }

    pub fn provider(&self, code: LangCode) -> Option<Provider<'_>> {
        self.blob(code)
            .map(|blob| Provider::new(code, self.index(), blob))
    }

    pub fn providers(&self) -> impl Iterator<Item = Provider<'_>> {
        self.languages
            .iter()
            .map(|language| Provider::new(language.code, self.index(), language.blob()))
    }

    /// Register every language, in image order.
    pub fn registry(&self) -> Result<Registry<'_>, RegistryError> {
        let mut builder = Registry::builder();
        for provider in self.providers() {
            builder.register(provider)?;
        }
        Ok(builder.finish())
    }

    /// Source string behind a string index.
    pub fn source(&self, index: u16) -> Option<&str> {
        self.sources.get(index as usize).map(String::as_str)
    }

    pub fn verify_digest(&self) -> Result<(), TableError> {
        let computed = self.index().digest();
        if computed == self.index_digest {
            Ok(())
        } else {
            Err(TableError::DigestMismatch {
                recorded: self.index_digest.clone(),
                computed,
            })
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing table image")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let image = Self::from_json_unverified(text)?;
        if image.schema != IMAGE_SCHEMA {
            return Err(anyhow!(
                "unsupported table image schema {:?} (expected {:?})",
                image.schema,
                IMAGE_SCHEMA
            ));
        }
        if image.version != IMAGE_VERSION {
            return Err(anyhow!(
                "unsupported table image version {} (expected {})",
                image.version,
                IMAGE_VERSION
            ));
        }
        image.verify_digest()?;
        Ok(image)
    }

    /// Parse without the schema, version and digest checks, for tooling
    /// that reports on broken images instead of refusing them.
    pub fn from_json_unverified(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing table image")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "table image saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = read_image(path)?;
        Self::from_json(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn load_unverified(path: &Path) -> Result<Self> {
        let text = read_image(path)?;
        Self::from_json_unverified(&text).with_context(|| format!("loading {}", path.display()))
    }
}

fn read_image(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading table image {}", path.display()))
}
