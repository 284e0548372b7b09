// SPDX-License-Identifier: PMPL-1.0-or-later

//! Health checks for a table image, behind `flashlang verify`.

use crate::image::{TableImage, IMAGE_SCHEMA, IMAGE_VERSION};
use anyhow::{anyhow, Result};
use colored::*;
use std::path::Path;

/// Mean bucket occupancy above which lookups are considered slow.
const OCCUPANCY_WARN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Warn,
    Error,
}

impl Level {
    fn tag(&self) -> ColoredString {
        match self {
            Level::Ok => "OK".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERR".red().bold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub label: String,
    pub level: Level,
    pub detail: String,
}

impl Diagnostic {
    fn new(label: impl Into<String>, level: Level, detail: String) -> Self {
        Self {
            label: label.into(),
            level,
            detail,
        }
    }

    fn ok(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Ok, detail)
    }

    fn warning(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Warn, detail)
    }

    fn error(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Error, detail)
    }

    pub fn print(&self) {
        println!("  [{}] {:22} {}", self.level.tag(), self.label, self.detail);
    }
}

pub fn check_image(image: &TableImage) -> Vec<Diagnostic> {
    let mut checks = Vec::new();

    if image.schema == IMAGE_SCHEMA && image.version == IMAGE_VERSION {
        checks.push(Diagnostic::ok(
            "format",
            format!("{} v{}", image.schema, image.version),
        ));
    } else {
        checks.push(Diagnostic::error(
            "format",
            format!(
                "{} v{} (expected {} v{})",
                image.schema, image.version, IMAGE_SCHEMA, IMAGE_VERSION
            ),
        ));
    }

    checks.push(match image.verify_digest() {
        Ok(()) => Diagnostic::ok(
            "index digest",
            image.index_digest.chars().take(16).collect(),
        ),
        Err(err) => Diagnostic::error("index digest", err.to_string()),
    });

    let index = image.index();
    checks.push(match index.validate() {
        Ok(()) => Diagnostic::ok(
            "hash index",
            format!(
                "{} records in {} buckets",
                index.record_count(),
                index.bucket_count()
            ),
        ),
        Err(err) => Diagnostic::error("hash index", err.to_string()),
    });

    let stats = index.stats();
    let occupancy = format!(
        "mean {:.2}, max {}, {} empty",
        stats.mean_occupancy, stats.max_occupancy, stats.empty_buckets
    );
    checks.push(if stats.mean_occupancy > OCCUPANCY_WARN {
        Diagnostic::warning("bucket occupancy", format!("{occupancy} (raise bucket_bits)"))
    } else {
        Diagnostic::ok("bucket occupancy", occupancy)
    });

    if image.languages.is_empty() {
        checks.push(Diagnostic::error(
            "languages",
            "image has no languages".to_string(),
        ));
    }
    match image.registry() {
        Ok(registry) => checks.push(Diagnostic::ok(
            "registry",
            format!("{} languages register cleanly", registry.len()),
        )),
        Err(err) => checks.push(Diagnostic::error("registry", err.to_string())),
    }

    for provider in image.providers() {
        let label = format!("language {}", provider.language());
        if let Err(err) = provider.validate() {
            checks.push(Diagnostic::error(label, err.to_string()));
            continue;
        }
        let blob = provider.blob();
        let untranslated = blob.iter().filter(|text| text.is_empty()).count();
        let detail = format!(
            "{} strings, {} bytes",
            blob.len(),
            blob.raw_len()
        );
        checks.push(if untranslated > 0 {
            Diagnostic::warning(label, format!("{detail}, {untranslated} untranslated"))
        } else {
            Diagnostic::ok(label, detail)
        });
    }

    checks
}

pub fn run_image_diagnostics(image: &TableImage) -> Result<()> {
    let checks = check_image(image);
    for entry in &checks {
        entry.print();
    }

    if checks.iter().any(|entry| entry.level == Level::Error) {
        Err(anyhow!("table image verification reported errors"))
    } else {
        Ok(())
    }
}

/// Check an image file as stored, including a stale digest or an unknown
/// format, which a verified load would refuse outright.
pub fn check_file(path: &Path) -> Result<Vec<Diagnostic>> {
    let image = TableImage::load_unverified(path)?;
    Ok(check_image(&image))
}

pub fn verify_file(path: &Path) -> Result<()> {
    println!("{} {}", "Verifying".bold(), path.display());
    let image = TableImage::load_unverified(path)?;
    run_image_diagnostics(&image).map_err(|err| anyhow!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{generate, Catalog, CatalogEntry, GenerateOptions};
    use crate::lang::LangCode;

    fn image() -> TableImage {
        let catalog = Catalog {
            languages: vec![LangCode::literal("de"), LangCode::literal("fr")],
            entries: vec![
                CatalogEntry {
                    source: "Home".into(),
                    translations: [
                        (LangCode::literal("de"), "Start".to_string()),
                        (LangCode::literal("fr"), "Accueil".to_string()),
                    ]
                    .into(),
                },
                CatalogEntry {
                    source: "Print".into(),
                    translations: [(LangCode::literal("de"), "Drucken".to_string())].into(),
                },
            ],
        };
        generate(&catalog, &GenerateOptions::default()).unwrap()
    }

    fn level_of<'c>(checks: &'c [Diagnostic], label: &str) -> Option<&'c Diagnostic> {
        checks.iter().find(|check| check.label == label)
    }

    #[test]
    fn clean_image_has_no_errors() {
        let checks = check_image(&image());
        assert!(checks.iter().all(|check| check.level != Level::Error));
        assert_eq!(level_of(&checks, "language de").unwrap().level, Level::Ok);
        let fr = level_of(&checks, "language fr").unwrap();
        assert_eq!(fr.level, Level::Warn);
        assert!(fr.detail.contains("1 untranslated"));
        assert!(run_image_diagnostics(&image()).is_ok());
    }

    #[test]
    fn broken_blob_is_an_error() {
        let mut image = image();
        image.languages[1].offsets[1] = 3;
        let checks = check_image(&image);
        assert_eq!(level_of(&checks, "language fr").unwrap().level, Level::Error);
        assert_eq!(level_of(&checks, "registry").unwrap().level, Level::Error);
        assert!(run_image_diagnostics(&image).is_err());
    }

    #[test]
    fn tampered_digest_is_an_error() {
        let mut image = image();
        image.index_digest = "0".repeat(64);
        let checks = check_image(&image);
        assert_eq!(level_of(&checks, "index digest").unwrap().level, Level::Error);
    }

    #[test]
    fn tampered_file_is_reported_not_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let mut tampered = image();
        tampered.index_digest = "0".repeat(64);
        tampered.version = IMAGE_VERSION + 1;
        tampered.save(&path).unwrap();

        let checks = check_file(&path).unwrap();
        assert_eq!(level_of(&checks, "index digest").unwrap().level, Level::Error);
        let format = level_of(&checks, "format").unwrap();
        assert_eq!(format.level, Level::Error);
        assert!(format.detail.contains("expected flashlang.table-image v1"));
        // The tables themselves are intact.
        assert_eq!(level_of(&checks, "hash index").unwrap().level, Level::Ok);
        assert!(verify_file(&path).is_err());

        image().save(&path).unwrap();
        assert!(verify_file(&path).is_ok());
        assert!(check_file(&dir.path().join("missing.json")).is_err());
    }
}
