// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types.
//!
//! Lookups that miss are ordinary outcomes and mostly surface as `Option`;
//! [`LookupError`] exists for callers that need to tell a missing string from
//! a missing language. [`TableError`] is the malformed-data class: it means
//! the generated tables are broken and startup must not continue with them.

use crate::lang::LangCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no translation for this source string")]
    NotFound,
    #[error("no translation tables registered for language `{0}`")]
    UnknownLanguage(LangCode),
}

/// Invariant violations in the generated tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("bucket count {0} is not a power of two")]
    BucketCountNotPowerOfTwo(usize),
    #[error("bucket {bucket} starts at {start}, expected {expected}")]
    BucketNotContiguous {
        bucket: usize,
        start: usize,
        expected: usize,
    },
    #[error("buckets cover {covered} records but the index holds {records}")]
    BucketsDoNotCoverRecords { covered: usize, records: usize },
    #[error("record {record} (hash {hash:#010x}) sits in bucket {bucket}, its hash maps to {expected}")]
    RecordInWrongBucket {
        record: usize,
        hash: u32,
        bucket: usize,
        expected: usize,
    },
    #[error("record {record}: hash {hash:#010x} is not greater than its predecessor")]
    RecordsNotSorted { record: usize, hash: u32 },
    #[error("record for hash {hash:#010x} points at string {index}, but the table holds {count}")]
    StringIndexOutOfRange { hash: u32, index: u16, count: usize },
    #[error("{count} strings exceed the 65536 a 16-bit string index can address")]
    TooManyStrings { count: usize },
    #[error("string table is empty or not NUL-terminated")]
    MissingTerminator,
    #[error("string {index}: offset {offset} is past the end of the {raw_len}-byte blob")]
    OffsetOutOfRange {
        index: usize,
        offset: usize,
        raw_len: usize,
    },
    #[error("string {index}: offset {offset} points into the middle of another string")]
    OffsetNotAtStringStart { index: usize, offset: usize },
    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("language `{language}` has {found} strings, other languages have {expected}")]
    StringCountMismatch {
        language: LangCode,
        expected: usize,
        found: usize,
    },
    #[error("language `{0}` was built against a different hash index")]
    IndexMismatch(LangCode),
    #[error("index digest mismatch: recorded {recorded}, computed {computed}")]
    DigestMismatch { recorded: String, computed: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("language `{0}` registered twice")]
    DuplicateLanguage(LangCode),
    #[error("registry is full ({0} languages)")]
    Full(usize),
    #[error("tables for language `{language}` are malformed: {source}")]
    Malformed {
        language: LangCode,
        #[source]
        source: TableError,
    },
    #[error("a translator is already installed")]
    AlreadyInstalled,
}
