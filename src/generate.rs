// SPDX-License-Identifier: PMPL-1.0-or-later

//! Host-side table generation.
//!
//! Turns a translation catalog (source strings with per-language texts) into
//! a [`TableImage`]: the shared bucket and record arrays plus one offset
//! table and string blob per language. Firmware never runs this; it links the
//! statics that `flashlang emit` renders from the image.
//!
//! Decisions made here that the run-time lookup relies on:
//!
//! - string indices follow first appearance in the catalog;
//! - a repeated source string is folded into its first occurrence;
//! - two different source strings with the same hash abort generation, since
//!   lookups never compare text;
//! - a language without a text for some string gets an empty string there;
//! - identical texts within one language are stored once.

use crate::hash::source_hash;
use crate::image::{LanguageImage, TableImage};
use crate::index::{BucketRange, Record};
use crate::lang::LangCode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Largest supported bucket count is `1 << MAX_BUCKET_BITS`.
pub const MAX_BUCKET_BITS: u8 = 15;

/// Average records per bucket that automatic sizing aims at or below.
pub const TARGET_OCCUPANCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub languages: Vec<LangCode>,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub source: String,
    #[serde(default)]
    pub translations: BTreeMap<LangCode, String>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing catalog {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// `log2` of the bucket count; chosen from the string count when `None`.
    pub bucket_bits: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("catalog declares no languages")]
    NoLanguages,
    #[error("language `{0}` declared twice")]
    DuplicateLanguage(LangCode),
    #[error("{text:?} has a translation for undeclared language `{language}`")]
    UnknownLanguage { text: String, language: LangCode },
    #[error("{first:?} and {second:?} share hash {hash:#010x}")]
    HashCollision {
        hash: u32,
        first: String,
        second: String,
    },
    #[error("text {text:?} contains a NUL byte")]
    EmbeddedNul { text: String },
    #[error("{0} distinct source strings exceed the 65535 an index can address")]
    TooManyStrings(usize),
    #[error("strings for `{language}` outgrow 16-bit offsets at {bytes} bytes")]
    BlobTooLarge { language: LangCode, bytes: usize },
    #[error("bucket bits {0} out of range (at most 15)")]
    BucketBitsOutOfRange(u8),
}

/// Smallest `bits` with `2^bits * TARGET_OCCUPANCY >= strings`.
pub fn auto_bucket_bits(strings: usize) -> u8 {
    let mut bits = 0;
    while (1usize << bits) * TARGET_OCCUPANCY < strings && bits < MAX_BUCKET_BITS {
        bits += 1;
    }
    bits
}

pub fn generate(catalog: &Catalog, options: &GenerateOptions) -> Result<TableImage, GenerateError> {
    if catalog.languages.is_empty() {
        return Err(GenerateError::NoLanguages);
    }
    for (i, language) in catalog.languages.iter().enumerate() {
        if catalog.languages[..i].contains(language) {
            return Err(GenerateError::DuplicateLanguage(*language));
        }
    }

    let unique = unique_entries(catalog)?;
    if unique.len() > u16::MAX as usize {
        return Err(GenerateError::TooManyStrings(unique.len()));
    }

    let bits = options
        .bucket_bits
        .unwrap_or_else(|| auto_bucket_bits(unique.len()));
    if bits > MAX_BUCKET_BITS {
        return Err(GenerateError::BucketBitsOutOfRange(bits));
    }
    let (buckets, records) = build_index(&unique, bits);

    let mut languages = Vec::with_capacity(catalog.languages.len());
    for &language in &catalog.languages {
        let texts = unique.iter().map(|entry| {
            entry
                .translations
                .get(&language)
                .map(String::as_str)
                .unwrap_or("")
        });
        languages.push(build_blob(language, texts)?);
    }

    debug!(
        strings = unique.len(),
        buckets = buckets.len(),
        languages = languages.len(),
        "generated translation tables"
    );
    let sources = unique.iter().map(|entry| entry.source.clone()).collect();
    Ok(TableImage::new(buckets, records, sources, languages))
}

/// Catalog entries with repeats folded, in first-appearance order.
fn unique_entries(catalog: &Catalog) -> Result<Vec<&CatalogEntry>, GenerateError> {
    let mut by_hash: HashMap<u32, usize> = HashMap::new();
    let mut unique: Vec<&CatalogEntry> = Vec::new();

    for entry in &catalog.entries {
        if entry.source.contains('\0') {
            return Err(GenerateError::EmbeddedNul {
                text: entry.source.clone(),
            });
        }
        if let Some(language) = entry
            .translations
            .keys()
            .find(|language| !catalog.languages.contains(language))
        {
            return Err(GenerateError::UnknownLanguage {
                text: entry.source.clone(),
                language: *language,
            });
        }

        let hash = source_hash(&entry.source);
        match by_hash.get(&hash) {
            Some(&i) if unique[i].source == entry.source => {
                if unique[i].translations != entry.translations {
                    warn!(
                        source = %entry.source,
                        "repeated source string with different translations; keeping the first"
                    );
                }
            }
            Some(&i) => {
                return Err(GenerateError::HashCollision {
                    hash,
                    first: unique[i].source.clone(),
                    second: entry.source.clone(),
                });
            }
            None => {
                by_hash.insert(hash, unique.len());
                unique.push(entry);
            }
        }
    }
    Ok(unique)
}

fn build_index(unique: &[&CatalogEntry], bits: u8) -> (Vec<BucketRange>, Vec<Record>) {
    let bucket_count = 1usize << bits;
    let mask = bucket_count - 1;

    let mut records: Vec<Record> = unique
        .iter()
        .enumerate()
        .map(|(i, entry)| Record::new(source_hash(&entry.source), i as u16))
        .collect();
    records.sort_by_key(|r| (r.hash() as usize & mask, r.hash()));

    let mut counts = vec![0u16; bucket_count];
    for record in &records {
        counts[record.hash() as usize & mask] += 1;
    }
    let mut start = 0u16;
    let buckets = counts
        .into_iter()
        .map(|count| {
            let range = BucketRange::new(start, count);
            start += count;
            range
        })
        .collect();
    (buckets, records)
}

fn build_blob<'t>(
    language: LangCode,
    texts: impl Iterator<Item = &'t str>,
) -> Result<LanguageImage, GenerateError> {
    let mut raw = Vec::new();
    let mut offsets = Vec::new();
    let mut stored: HashMap<&str, u16> = HashMap::new();

    for text in texts {
        if text.contains('\0') {
            return Err(GenerateError::EmbeddedNul {
                text: text.to_string(),
            });
        }
        if let Some(&offset) = stored.get(text) {
            offsets.push(offset);
            continue;
        }
        let offset = u16::try_from(raw.len()).map_err(|_| GenerateError::BlobTooLarge {
            language,
            bytes: raw.len(),
        })?;
        raw.extend_from_slice(text.as_bytes());
        raw.push(0);
        stored.insert(text, offset);
        offsets.push(offset);
    }
    if raw.is_empty() {
        raw.push(0);
    }
    Ok(LanguageImage {
        code: language,
        offsets,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, translations: &[(&str, &str)]) -> CatalogEntry {
        CatalogEntry {
            source: source.to_string(),
            translations: translations
                .iter()
                .map(|(code, text)| (LangCode::literal(code), text.to_string()))
                .collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            languages: vec![LangCode::literal("de"), LangCode::literal("it")],
            entries: vec![
                entry("Home", &[("de", "Start"), ("it", "Home")]),
                entry("Settings", &[("de", "Einstellungen"), ("it", "Impostazioni")]),
                entry("Print", &[("de", "Drucken")]),
                entry("Home", &[("de", "Start"), ("it", "Home")]),
                entry("Reprint", &[("de", "Drucken"), ("it", "Ristampa")]),
            ],
        }
    }

    #[test]
    fn auto_sizing() {
        assert_eq!(auto_bucket_bits(0), 0);
        assert_eq!(auto_bucket_bits(4), 0);
        assert_eq!(auto_bucket_bits(5), 1);
        assert_eq!(auto_bucket_bits(64), 4);
        assert_eq!(auto_bucket_bits(65), 5);
        assert_eq!(auto_bucket_bits(usize::MAX), MAX_BUCKET_BITS);
    }

    #[test]
    fn generated_tables_resolve() {
        let image = generate(&catalog(), &GenerateOptions { bucket_bits: Some(2) }).unwrap();
        let index = image.index();
        index.validate().unwrap();
        assert_eq!(index.bucket_count(), 4);
        assert_eq!(index.record_count(), 4);
        assert_eq!(image.sources, ["Home", "Settings", "Print", "Reprint"]);

        let de = image.provider(LangCode::literal("de")).unwrap();
        let it = image.provider(LangCode::literal("it")).unwrap();
        de.validate().unwrap();
        assert_eq!(de.resolve(source_hash("Settings")), Some("Einstellungen"));
        assert_eq!(it.resolve(source_hash("Reprint")), Some("Ristampa"));
        // Missing translation stays indexable as an empty string.
        assert_eq!(it.resolve(source_hash("Print")), Some(""));
        assert_eq!(de.resolve(source_hash("Parking")), None);
    }

    #[test]
    fn identical_texts_share_storage() {
        let image = generate(&catalog(), &GenerateOptions::default()).unwrap();
        let de = image.blob(LangCode::literal("de")).unwrap();
        assert_eq!(de.offsets()[2], de.offsets()[3]);
        assert_eq!(de.raw(), b"Start\0Einstellungen\0Drucken\0");
    }

    #[test]
    fn records_sorted_within_buckets() {
        let entries = (0..200)
            .map(|i| entry(&format!("Message {i}"), &[]))
            .collect();
        let catalog = Catalog {
            languages: vec![LangCode::literal("pl")],
            entries,
        };
        let image = generate(&catalog, &GenerateOptions::default()).unwrap();
        let index = image.index();
        index.validate().unwrap();
        assert_eq!(index.bucket_count(), 64);
        for i in 0..200 {
            let hash = source_hash(&format!("Message {i}"));
            assert_eq!(index.find(hash), Some(i as u16));
        }
    }

    #[test]
    fn rejects_hash_collisions() {
        assert_eq!(source_hash("label 84509"), source_hash("label 1644586"));
        let mut catalog = catalog();
        catalog.entries.push(entry("label 84509", &[]));
        catalog.entries.push(entry("label 1644586", &[]));
        assert_eq!(
            generate(&catalog, &GenerateOptions::default()).unwrap_err(),
            GenerateError::HashCollision {
                hash: 0xe6a7_b9d5,
                first: "label 84509".into(),
                second: "label 1644586".into()
            }
        );
    }

    #[test]
    fn rejects_undeclared_language() {
        let mut catalog = catalog();
        catalog.entries.push(entry("Cancel", &[("fr", "Annuler")]));
        assert_eq!(
            generate(&catalog, &GenerateOptions::default()).unwrap_err(),
            GenerateError::UnknownLanguage {
                text: "Cancel".into(),
                language: LangCode::literal("fr")
            }
        );
    }

    #[test]
    fn rejects_embedded_nul() {
        let mut catalog = catalog();
        catalog.entries.push(entry("Cancel", &[("de", "Ab\0brechen")]));
        assert!(matches!(
            generate(&catalog, &GenerateOptions::default()),
            Err(GenerateError::EmbeddedNul { .. })
        ));
    }

    #[test]
    fn rejects_bad_language_lists_and_bucket_bits() {
        let mut catalog = catalog();
        assert_eq!(
            generate(&catalog, &GenerateOptions { bucket_bits: Some(16) }).unwrap_err(),
            GenerateError::BucketBitsOutOfRange(16)
        );
        catalog.languages.push(LangCode::literal("de"));
        assert_eq!(
            generate(&catalog, &GenerateOptions::default()).unwrap_err(),
            GenerateError::DuplicateLanguage(LangCode::literal("de"))
        );
        catalog.languages.clear();
        assert_eq!(
            generate(&catalog, &GenerateOptions::default()).unwrap_err(),
            GenerateError::NoLanguages
        );
    }

    #[test]
    fn empty_catalog_still_yields_valid_blobs() {
        let catalog = Catalog {
            languages: vec![LangCode::literal("cs")],
            entries: Vec::new(),
        };
        let image = generate(&catalog, &GenerateOptions::default()).unwrap();
        image.registry().expect("empty tables register");
    }

    #[test]
    fn catalog_json_shape() {
        let text = r#"{
            "languages": ["cs"],
            "entries": [
                { "source": "Parking", "translations": { "cs": "Parkování" } },
                { "source": "Home" }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(text).unwrap();
        assert_eq!(catalog.entries.len(), 2);
        assert!(catalog.entries[1].translations.is_empty());
    }
}
