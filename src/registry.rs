// SPDX-License-Identifier: PMPL-1.0-or-later

//! Directory of translation providers keyed by language code.
//!
//! A registry has two states. [`RegistryBuilder`] is the uninitialized one:
//! startup code registers each language's provider on it, in an explicit
//! sequence, and every registration validates the tables. [`RegistryBuilder::finish`]
//! turns it into a [`Registry`], which is immutable and only answers lookups.
//!
//! Storage is a fixed array of [`MAX_LANGUAGES`] slots, so neither state
//! allocates.

use crate::error::{LookupError, RegistryError, TableError};
use crate::lang::LangCode;
use crate::provider::Provider;
use tracing::{debug, warn};

/// Slots in a registry.
pub const MAX_LANGUAGES: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct Registry<'a> {
    providers: [Option<Provider<'a>>; MAX_LANGUAGES],
    len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RegistryBuilder<'a> {
    registry: Registry<'a>,
}

impl<'a> RegistryBuilder<'a> {
    pub const fn new() -> Self {
        Self {
            registry: Registry {
                providers: [None; MAX_LANGUAGES],
                len: 0,
            },
        }
    }

    /// Register one language.
    ///
    /// Registering a code twice, or tables that fail validation, is a defect
    /// in the firmware image and is reported rather than ignored. All
    /// providers must share one hash index and hold the same number of
    /// strings.
    pub fn register(&mut self, provider: Provider<'a>) -> Result<&mut Self, RegistryError> {
        let language = provider.language();
        if self.registry.slot_of(language).is_some() {
            return Err(RegistryError::DuplicateLanguage(language));
        }
        if self.registry.len == MAX_LANGUAGES {
            return Err(RegistryError::Full(MAX_LANGUAGES));
        }

        let malformed = |source: TableError| {
            warn!(%language, error = %source, "rejecting translation tables");
            RegistryError::Malformed { language, source }
        };
        provider.validate().map_err(malformed)?;
        if let Some(first) = self.registry.providers().next() {
            if first.index() != provider.index() {
                return Err(malformed(TableError::IndexMismatch(language)));
            }
            if first.string_count() != provider.string_count() {
                return Err(malformed(TableError::StringCountMismatch {
                    language,
                    expected: first.string_count(),
                    found: provider.string_count(),
                }));
            }
        }

        self.registry.providers[self.registry.len] = Some(provider);
        self.registry.len += 1;
        debug!(
            %language,
            strings = provider.string_count(),
            bytes = provider.blob().raw_len(),
            "registered translation provider"
        );
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.registry.len
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len == 0
    }

    /// Close registration.
    pub fn finish(self) -> Registry<'a> {
        self.registry
    }
}

impl Default for RegistryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Registry<'a> {
    pub const fn builder() -> RegistryBuilder<'a> {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn slot_of(&self, language: LangCode) -> Option<usize> {
        self.providers().position(|p| p.language() == language)
    }

    pub(crate) fn provider_at(&self, slot: usize) -> Option<&Provider<'a>> {
        self.providers.get(slot).and_then(Option::as_ref)
    }

    pub fn provider(&self, language: LangCode) -> Option<&Provider<'a>> {
        self.providers().find(|p| p.language() == language)
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider<'a>> {
        self.providers[..self.len].iter().flatten()
    }

    /// Registered language codes, in registration order.
    pub fn supported_languages(&self) -> impl Iterator<Item = LangCode> + use<'_, 'a> {
        self.providers().map(Provider::language)
    }

    /// Translation of `hash` in `language`; `None` when either the language
    /// or the string is unknown.
    pub fn resolve(&self, language: LangCode, hash: u32) -> Option<&'a str> {
        self.provider(language)?.resolve(hash)
    }

    /// Like [`Registry::resolve`], but says which part was missing.
    pub fn try_resolve(&self, language: LangCode, hash: u32) -> Result<&'a str, LookupError> {
        self.provider(language)
            .ok_or(LookupError::UnknownLanguage(language))?
            .resolve(hash)
            .ok_or(LookupError::NotFound)
    }
}
