// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-language string storage.
//!
//! One language's translations live in a single byte blob of NUL-terminated
//! UTF-8 strings, addressed through a table of `u16` start offsets. String
//! `i` runs from `offsets[i]` to the next NUL. Identical texts may share one
//! stored copy, so several offsets can be equal.

use crate::error::TableError;

/// Most strings a 16-bit string index can address.
pub const MAX_STRINGS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringBlob<'a> {
    offsets: &'a [u16],
    raw: &'a [u8],
}

impl<'a> StringBlob<'a> {
    /// Wrap generated tables without checking them; see [`StringBlob::validate`].
    pub const fn new(offsets: &'a [u16], raw: &'a [u8]) -> Self {
        Self { offsets, raw }
    }

    /// Number of strings.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn offsets(&self) -> &'a [u16] {
        self.offsets
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Borrow string `index`.
    ///
    /// An index past the end is a caller bug: debug builds panic, release
    /// builds return `""` without reading outside the blob.
    pub fn get(&self, index: u16) -> &'a str {
        debug_assert!(
            (index as usize) < self.offsets.len(),
            "string index {index} out of range ({} strings)",
            self.offsets.len()
        );
        let Some(&offset) = self.offsets.get(index as usize) else {
            return "";
        };
        text_at(self.raw, offset)
    }

    /// All strings in offset-table order.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        let (offsets, raw) = (self.offsets, self.raw);
        offsets.iter().map(move |&offset| text_at(raw, offset))
    }

    /// Check offsets, terminators and encoding of every string.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.offsets.len() > MAX_STRINGS {
            return Err(TableError::TooManyStrings {
                count: self.offsets.len(),
            });
        }
        if self.raw.last() != Some(&0) {
            return Err(TableError::MissingTerminator);
        }
        for (index, &offset) in self.offsets.iter().enumerate() {
            let offset = offset as usize;
            if offset >= self.raw.len() {
                return Err(TableError::OffsetOutOfRange {
                    index,
                    offset,
                    raw_len: self.raw.len(),
                });
            }
            if offset > 0 && self.raw[offset - 1] != 0 {
                return Err(TableError::OffsetNotAtStringStart { index, offset });
            }
            if std::str::from_utf8(terminated(self.raw, offset)).is_err() {
                return Err(TableError::InvalidUtf8 { index });
            }
        }
        Ok(())
    }
}

fn text_at(raw: &[u8], offset: u16) -> &str {
    let text = std::str::from_utf8(terminated(raw, offset as usize));
    debug_assert!(text.is_ok(), "string at offset {offset} is not valid UTF-8");
    text.unwrap_or("")
}

/// Bytes from `offset` up to the next NUL, or to the end of `raw`.
fn terminated(raw: &[u8], offset: usize) -> &[u8] {
    let tail = raw.get(offset..).unwrap_or(&[]);
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    &tail[..end]
}
