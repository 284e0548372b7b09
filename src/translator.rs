// SPDX-License-Identifier: PMPL-1.0-or-later

//! Active-language selection on top of a finished [`Registry`].
//!
//! The active language is a single `AtomicU8` holding a registry slot. The
//! language menu is the one writer; every label draw is a reader. A draw
//! racing a language switch may render one string in the previous language,
//! which the next redraw corrects.

use crate::error::LookupError;
use crate::hash::source_hash;
use crate::lang::LangCode;
use crate::registry::Registry;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Slot value meaning "show the untranslated source text".
const SOURCE_TEXT: u8 = u8::MAX;

#[derive(Debug)]
pub struct Translator<'a> {
    registry: Registry<'a>,
    active: AtomicU8,
    fallback: Option<u8>,
}

impl<'a> Translator<'a> {
    /// Start out showing source text until a language is selected.
    pub fn new(registry: Registry<'a>) -> Self {
        Self {
            registry,
            active: AtomicU8::new(SOURCE_TEXT),
            fallback: None,
        }
    }

    /// Consult `language` when the active language has no usable text.
    pub fn with_fallback(mut self, language: LangCode) -> Result<Self, LookupError> {
        self.fallback = Some(self.slot(language)?);
        Ok(self)
    }

    pub fn registry(&self) -> &Registry<'a> {
        &self.registry
    }

    pub fn set_active_language(&self, language: LangCode) -> Result<(), LookupError> {
        let slot = self.slot(language)?;
        self.active.store(slot, Ordering::Release);
        debug!(%language, "active language changed");
        Ok(())
    }

    /// Switch back to untranslated source text.
    pub fn use_source_language(&self) {
        self.active.store(SOURCE_TEXT, Ordering::Release);
        debug!("showing source text");
    }

    /// `None` while source text is shown.
    pub fn active_language(&self) -> Option<LangCode> {
        self.language_at(self.active.load(Ordering::Acquire))
    }

    pub fn fallback_language(&self) -> Option<LangCode> {
        self.fallback.and_then(|slot| self.language_at(slot))
    }

    /// Translation in the active language, then in the fallback language.
    /// `None` while source text is shown.
    pub fn resolve(&self, hash: u32) -> Option<&'a str> {
        let active = self.active.load(Ordering::Acquire);
        if active == SOURCE_TEXT {
            return None;
        }
        self.lookup(active, hash)
            .or_else(|| self.fallback.and_then(|slot| self.lookup(slot, hash)))
    }

    /// Text to display for `source`.
    ///
    /// Empty translations count as untranslated, so the result is the
    /// active language's text, else the fallback language's, else `source`.
    pub fn translate<'s>(&self, source: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.translate_hash(source_hash(source), source)
    }

    /// [`Translator::translate`] with a precomputed hash.
    pub fn translate_hash<'s>(&self, hash: u32, source: &'s str) -> &'s str
    where
        'a: 's,
    {
        let active = self.active.load(Ordering::Acquire);
        if active == SOURCE_TEXT {
            return source;
        }
        let usable = |slot: u8| self.lookup(slot, hash).filter(|text| !text.is_empty());
        usable(active)
            .or_else(|| self.fallback.and_then(usable))
            .unwrap_or(source)
    }

    fn slot(&self, language: LangCode) -> Result<u8, LookupError> {
        self.registry
            .slot_of(language)
            .map(|slot| slot as u8)
            .ok_or(LookupError::UnknownLanguage(language))
    }

    fn language_at(&self, slot: u8) -> Option<LangCode> {
        self.registry
            .provider_at(slot as usize)
            .map(|provider| provider.language())
    }

    fn lookup(&self, slot: u8, hash: u32) -> Option<&'a str> {
        self.registry.provider_at(slot as usize)?.resolve(hash)
    }
}
