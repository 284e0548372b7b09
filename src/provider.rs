// SPDX-License-Identifier: PMPL-1.0-or-later

//! Binding of the shared hash index to one language's strings.

use crate::blob::StringBlob;
use crate::error::TableError;
use crate::index::HashIndex;
use crate::lang::LangCode;

/// Translation tables for one language.
///
/// Cheap to copy: three borrowed slices and a two-byte code. Every provider
/// registered together shares the same [`HashIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider<'a> {
    language: LangCode,
    index: HashIndex<'a>,
    blob: StringBlob<'a>,
}

impl<'a> Provider<'a> {
    pub const fn new(language: LangCode, index: HashIndex<'a>, blob: StringBlob<'a>) -> Self {
        Self {
            language,
            index,
            blob,
        }
    }

    pub fn language(&self) -> LangCode {
        self.language
    }

    pub fn index(&self) -> &HashIndex<'a> {
        &self.index
    }

    pub fn blob(&self) -> &StringBlob<'a> {
        &self.blob
    }

    pub fn string_count(&self) -> usize {
        self.blob.len()
    }

    /// Translated text for a source hash, borrowed from the blob.
    pub fn resolve(&self, hash: u32) -> Option<&'a str> {
        self.index.find(hash).map(|i| self.blob.get(i))
    }

    /// Validate the index, the blob, and that every record addresses a
    /// string this blob holds.
    pub fn validate(&self) -> Result<(), TableError> {
        self.index.validate()?;
        self.blob.validate()?;
        let count = self.blob.len();
        match self
            .index
            .records()
            .iter()
            .find(|r| r.string_index() as usize >= count)
        {
            Some(record) => Err(TableError::StringIndexOutOfRange {
                hash: record.hash(),
                index: record.string_index(),
                count,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::source_hash;
    use crate::index::{BucketRange, Record};

    // One bucket holding "Home" (0x52f50eae) and "Print" (0xe8320d28).
    static BUCKETS: [BucketRange; 1] = [BucketRange::new(0, 2)];
    static RECORDS: [Record; 2] = [Record::new(0x52f5_0eae, 0), Record::new(0xe832_0d28, 1)];
    static FR_OFFSETS: [u16; 2] = [0, 8];
    static FR_RAW: &[u8] = "Accueil\0Imprimer\0".as_bytes();

    fn provider() -> Provider<'static> {
        Provider::new(
            LangCode::literal("fr"),
            HashIndex::new(&BUCKETS, &RECORDS),
            StringBlob::new(&FR_OFFSETS, FR_RAW),
        )
    }

    #[test]
    fn resolves_through_index_and_blob() {
        let provider = provider();
        provider.validate().unwrap();
        assert_eq!(provider.resolve(source_hash("Home")), Some("Accueil"));
        assert_eq!(provider.resolve(source_hash("Print")), Some("Imprimer"));
        assert_eq!(provider.resolve(source_hash("Parking")), None);
        assert_eq!(provider.language().as_str(), "fr");
        assert_eq!(provider.string_count(), 2);
    }

    #[test]
    fn resolve_is_idempotent() {
        let provider = provider();
        let hash = source_hash("Print");
        let first = provider.resolve(hash).unwrap();
        for _ in 0..4 {
            assert!(std::ptr::eq(first, provider.resolve(hash).unwrap()));
        }
    }

    #[test]
    fn record_past_the_blob_is_malformed() {
        let short = Provider::new(
            LangCode::literal("fr"),
            HashIndex::new(&BUCKETS, &RECORDS),
            StringBlob::new(&FR_OFFSETS[..1], FR_RAW),
        );
        assert_eq!(
            short.validate(),
            Err(TableError::StringIndexOutOfRange {
                hash: 0xe832_0d28,
                index: 1,
                count: 1
            })
        );
    }
}
