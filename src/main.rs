// SPDX-License-Identifier: PMPL-1.0-or-later

//! flashlang: build, inspect and emit firmware translation tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use flashlang::config::Config;
use flashlang::diagnostics;
use flashlang::emit;
use flashlang::generate::{self, Catalog, GenerateOptions};
use flashlang::image::TableImage;
use flashlang::{source_hash, LangCode, Translator};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flashlang")]
#[command(version)]
#[command(about = "Hash-indexed translation tables for firmware")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (default: ./flashlang.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a table image from a JSON catalog
    Build {
        /// Catalog of source strings and translations
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Table image to write
        #[arg(short, long)]
        output: PathBuf,

        /// log2 of the bucket count (default: sized from the string count)
        #[arg(long)]
        bucket_bits: Option<u8>,
    },

    /// Render a table image as Rust statics
    Emit {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Rust source file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Translate a source string through a table image
    Lookup {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Source text, exactly as it appears in the firmware
        #[arg(value_name = "TEXT")]
        text: String,

        /// Active language (default: configured language)
        #[arg(short, long)]
        lang: Option<LangCode>,
    },

    /// Print the lookup hash of source strings
    Hash {
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },

    /// List the languages in a table image
    Langs {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Check a table image for structural problems
    Verify {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
}

impl Commands {
    /// Only these read `flashlang.yaml` and `FLASHLANG_LANG`.
    fn uses_config(&self) -> bool {
        matches!(self, Commands::Build { .. } | Commands::Lookup { .. })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flashlang=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = if cli.command.uses_config() {
        Config::load(cli.config.as_deref())?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Build {
            catalog,
            output,
            bucket_bits,
        } => {
            let parsed = Catalog::load(&catalog)?;
            let options = GenerateOptions {
                bucket_bits: bucket_bits.or(config.bucket_bits),
            };
            let image = generate::generate(&parsed, &options)
                .with_context(|| format!("generating tables from {}", catalog.display()))?;
            image.save(&output)?;
            info!(
                strings = image.sources.len(),
                buckets = image.buckets.len(),
                languages = image.languages.len(),
                output = %output.display(),
                "table image written"
            );
        }

        Commands::Emit { image, output } => {
            let image = TableImage::load(&image)?;
            let rust = emit::render_rust(&image)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(&output, rust).with_context(|| format!("writing {}", output.display()))?;
            info!(output = %output.display(), "rust tables written");
        }

        Commands::Lookup { image, text, lang } => {
            let image = TableImage::load(&image)?;
            let mut translator = Translator::new(image.registry()?);
            if let Some(fallback) = config.fallback_language {
                translator = translator
                    .with_fallback(fallback)
                    .with_context(|| format!("fallback language `{fallback}`"))?;
            }
            if let Some(language) = lang.or(config.default_language) {
                translator
                    .set_active_language(language)
                    .with_context(|| format!("active language `{language}`"))?;
            }

            if image.index().find(source_hash(&text)).is_none() {
                eprintln!("{} {:?} is not in the tables", "note:".yellow(), text);
            }
            println!("{}", translator.translate(&text));
        }

        Commands::Hash { texts } => {
            for text in &texts {
                println!("{:#010x}  {:?}", source_hash(text), text);
            }
        }

        Commands::Langs { image } => {
            let image = TableImage::load(&image)?;
            for provider in image.providers() {
                let code = provider.language();
                println!(
                    "{}  {:12} {:12} {} strings",
                    code.as_str().bold(),
                    code.language_name().unwrap_or("?"),
                    code.native_name().unwrap_or("?"),
                    provider.string_count()
                );
            }
        }

        Commands::Verify { image } => {
            diagnostics::verify_file(&image)?;
        }
    }

    Ok(())
}
