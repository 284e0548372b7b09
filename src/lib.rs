// SPDX-License-Identifier: PMPL-1.0-or-later

//! flashlang: hash-indexed, multi-language text lookup for firmware.
//!
//! Source strings stay in the firmware as they are written. At run time a
//! string is hashed with FNV-1a, the hash picks a bucket of a shared
//! [`HashIndex`], and the record found there names a string index into the
//! active language's [`StringBlob`]. All tables are borrowed slices, so the
//! same code reads `'static` arrays linked into flash and tables loaded from
//! a [`TableImage`](image::TableImage) on the host.
//!
//! RUN TIME:
//! 1. **Provider**: one language's blob over the shared index.
//! 2. **Registry**: up to [`MAX_LANGUAGES`] providers, validated on entry.
//! 3. **Translator**: the active language and `translate`.
//!
//! HOST TOOLING: catalog generation, JSON table images, Rust emission and
//! image diagnostics, driven by the `flashlang` binary.

pub mod blob;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod generate;
pub mod global;
pub mod hash;
pub mod image;
pub mod index;
pub mod lang;
pub mod provider;
pub mod registry;
pub mod translator;

pub use blob::StringBlob;
pub use error::{LookupError, RegistryError, TableError};
pub use hash::source_hash;
pub use index::{BucketRange, HashIndex, IndexStats, Record};
pub use lang::LangCode;
pub use provider::Provider;
pub use registry::{Registry, RegistryBuilder, MAX_LANGUAGES};
pub use translator::Translator;
