// SPDX-License-Identifier: PMPL-1.0-or-later

//! The language-independent hash index.
//!
//! Records `(hash, string_index)` are grouped into `B` buckets (`B` a power
//! of two) by `hash & (B - 1)`, and sorted by hash inside each bucket. A
//! bucket is described by a `(start, count)` range into the record array;
//! the ranges are contiguous and together cover every record.
//!
//! ```text
//! buckets:  [0,2) [2,3) [3,4) [4,8)
//! records:  h0 h1 | h2 | h3 | h4 h5 h6 h7      (ascending within a bar)
//! ```
//!
//! A lookup touches exactly one bucket and binary-searches it. The index
//! borrows its slices, so flash-resident `'static` arrays and tables loaded
//! by host tooling share this code.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Contiguous range of records belonging to one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct BucketRange {
    start: u16,
    count: u16,
}

impl BucketRange {
    pub const fn new(start: u16, count: u16) -> Self {
        Self { start, count }
    }

    pub const fn start(&self) -> u16 {
        self.start
    }

    pub const fn count(&self) -> u16 {
        self.count
    }

    pub fn range(&self) -> Range<usize> {
        let start = self.start as usize;
        start..start + self.count as usize
    }
}

/// One source-string hash and the string index it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct Record {
    hash: u32,
    string_index: u16,
}

impl Record {
    pub const fn new(hash: u32, string_index: u16) -> Self {
        Self { hash, string_index }
    }

    pub const fn hash(&self) -> u32 {
        self.hash
    }

    pub const fn string_index(&self) -> u16 {
        self.string_index
    }
}

/// Occupancy figures, used by `flashlang verify` to judge bucket sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    pub buckets: usize,
    pub records: usize,
    pub empty_buckets: usize,
    pub max_occupancy: usize,
    pub mean_occupancy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashIndex<'a> {
    buckets: &'a [BucketRange],
    records: &'a [Record],
}

impl<'a> HashIndex<'a> {
    /// Wrap generated tables without checking them. Run [`validate`] once
    /// before trusting lookups; the registry does this on registration.
    ///
    /// [`validate`]: HashIndex::validate
    pub const fn new(buckets: &'a [BucketRange], records: &'a [Record]) -> Self {
        Self { buckets, records }
    }

    pub fn buckets(&self) -> &'a [BucketRange] {
        self.buckets
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Bucket a hash belongs to.
    pub fn bucket_of(&self, hash: u32) -> usize {
        hash as usize & self.buckets.len().wrapping_sub(1)
    }

    /// Records of bucket `b`; empty when `b` or its range is out of bounds.
    pub fn bucket(&self, b: usize) -> &'a [Record] {
        self.buckets
            .get(b)
            .and_then(|range| self.records.get(range.range()))
            .unwrap_or(&[])
    }

    /// Resolve a source hash to its string index.
    ///
    /// Searches only the bucket the hash maps to. A miss is an expected
    /// outcome (untranslated text, or text added after the tables were
    /// generated), never an error.
    pub fn find(&self, hash: u32) -> Option<u16> {
        let bucket = self.bucket(self.bucket_of(hash));
        bucket
            .binary_search_by_key(&hash, Record::hash)
            .ok()
            .map(|i| bucket[i].string_index)
    }

    /// Smallest string count every language blob must provide.
    pub fn string_count_hint(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.string_index as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check every structural invariant of the index.
    pub fn validate(&self) -> Result<(), TableError> {
        let bucket_count = self.buckets.len();
        if !bucket_count.is_power_of_two() {
            return Err(TableError::BucketCountNotPowerOfTwo(bucket_count));
        }

        let mut expected = 0usize;
        for (b, range) in self.buckets.iter().enumerate() {
            if range.start as usize != expected {
                return Err(TableError::BucketNotContiguous {
                    bucket: b,
                    start: range.start as usize,
                    expected,
                });
            }
            expected += range.count as usize;
        }
        if expected != self.records.len() {
            return Err(TableError::BucketsDoNotCoverRecords {
                covered: expected,
                records: self.records.len(),
            });
        }

        for (b, range) in self.buckets.iter().enumerate() {
            let mut previous: Option<u32> = None;
            for position in range.range() {
                let record = self.records[position];
                let home = self.bucket_of(record.hash);
                if home != b {
                    return Err(TableError::RecordInWrongBucket {
                        record: position,
                        hash: record.hash,
                        bucket: b,
                        expected: home,
                    });
                }
                if previous.is_some_and(|p| p >= record.hash) {
                    return Err(TableError::RecordsNotSorted {
                        record: position,
                        hash: record.hash,
                    });
                }
                previous = Some(record.hash);
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        let occupancy = self.buckets.iter().map(|b| b.count as usize);
        let buckets = self.buckets.len();
        IndexStats {
            buckets,
            records: self.records.len(),
            empty_buckets: occupancy.clone().filter(|&c| c == 0).count(),
            max_occupancy: occupancy.max().unwrap_or(0),
            mean_occupancy: if buckets == 0 {
                0.0
            } else {
                self.records.len() as f64 / buckets as f64
            },
        }
    }

    /// BLAKE3 digest of the index contents, hex encoded.
    ///
    /// Table images record it so a language blob is never paired with an
    /// index it was not generated against.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"flashlang.index.v1");
        hasher.update(&(self.buckets.len() as u32).to_le_bytes());
        for bucket in self.buckets {
            hasher.update(&bucket.start.to_le_bytes());
            hasher.update(&bucket.count.to_le_bytes());
        }
        for record in self.records {
            hasher.update(&record.hash.to_le_bytes());
            hasher.update(&record.string_index.to_le_bytes());
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four buckets. Hashes chosen so their low two bits pick the bucket.
    const BUCKETS: [BucketRange; 4] = [
        BucketRange::new(0, 2),
        BucketRange::new(2, 0),
        BucketRange::new(2, 1),
        BucketRange::new(3, 3),
    ];
    const RECORDS: [Record; 6] = [
        Record::new(0x0000_0010, 4),
        Record::new(0xffff_fff0, 0),
        Record::new(0x1234_5672, 1),
        Record::new(0x0000_0003, 5),
        Record::new(0x8000_0003, 2),
        Record::new(0x8000_0007, 3),
    ];

    fn index() -> HashIndex<'static> {
        HashIndex::new(&BUCKETS, &RECORDS)
    }

    #[test]
    fn finds_every_record() {
        let index = index();
        index.validate().expect("fixture is well formed");
        for record in RECORDS {
            assert_eq!(index.find(record.hash()), Some(record.string_index()));
        }
    }

    #[test]
    fn misses_are_none() {
        let index = index();
        assert_eq!(index.find(0x0000_0001), None); // empty bucket
        assert_eq!(index.find(0x0000_0020), None); // populated bucket, absent hash
        assert_eq!(index.find(0x8000_0005), None);
    }

    #[test]
    fn search_stays_inside_the_bucket() {
        // 0x0000_0010 lives in bucket 0; the same value shifted into
        // bucket 3 must not be found by scanning neighbours.
        let index = index();
        assert_eq!(index.bucket_of(0x0000_0013), 3);
        assert_eq!(index.find(0x0000_0013), None);
        assert!(index.bucket(1).is_empty());
        assert_eq!(index.bucket(3).len(), 3);
    }

    #[test]
    fn rejects_non_power_of_two_bucket_count() {
        let buckets = [BucketRange::new(0, 0); 3];
        let index = HashIndex::new(&buckets, &[]);
        assert_eq!(
            index.validate(),
            Err(TableError::BucketCountNotPowerOfTwo(3))
        );
        let empty = HashIndex::new(&[], &[]);
        assert_eq!(
            empty.validate(),
            Err(TableError::BucketCountNotPowerOfTwo(0))
        );
        assert_eq!(empty.find(7), None);
    }

    #[test]
    fn rejects_gaps_and_short_coverage() {
        let gap = [BucketRange::new(0, 1), BucketRange::new(2, 1)];
        let records = [Record::new(2, 0), Record::new(1, 1), Record::new(3, 2)];
        assert_eq!(
            HashIndex::new(&gap, &records).validate(),
            Err(TableError::BucketNotContiguous {
                bucket: 1,
                start: 2,
                expected: 1
            })
        );

        let short = [BucketRange::new(0, 1), BucketRange::new(1, 1)];
        assert_eq!(
            HashIndex::new(&short, &records).validate(),
            Err(TableError::BucketsDoNotCoverRecords {
                covered: 2,
                records: 3
            })
        );
    }

    #[test]
    fn rejects_misplaced_and_unsorted_records() {
        let buckets = [BucketRange::new(0, 2), BucketRange::new(2, 0)];
        let misplaced = [Record::new(2, 0), Record::new(5, 1)];
        assert!(matches!(
            HashIndex::new(&buckets, &misplaced).validate(),
            Err(TableError::RecordInWrongBucket { record: 1, .. })
        ));

        let unsorted = [Record::new(4, 0), Record::new(2, 1)];
        assert_eq!(
            HashIndex::new(&buckets, &unsorted).validate(),
            Err(TableError::RecordsNotSorted { record: 1, hash: 2 })
        );

        let duplicate = [Record::new(4, 0), Record::new(4, 1)];
        assert!(HashIndex::new(&buckets, &duplicate).validate().is_err());
    }

    #[test]
    fn out_of_bounds_range_is_a_miss_not_a_panic() {
        let buckets = [BucketRange::new(0, 9)];
        let records = [Record::new(1, 0)];
        let index = HashIndex::new(&buckets, &records);
        assert!(index.validate().is_err());
        assert_eq!(index.find(1), None);
    }

    #[test]
    fn stats_and_hint() {
        let stats = index().stats();
        assert_eq!(stats.buckets, 4);
        assert_eq!(stats.records, 6);
        assert_eq!(stats.empty_buckets, 1);
        assert_eq!(stats.max_occupancy, 3);
        assert!((stats.mean_occupancy - 1.5).abs() < f64::EPSILON);
        assert_eq!(index().string_count_hint(), 6);
    }

    #[test]
    fn digest_tracks_content() {
        let digest = index().digest();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, index().digest());

        let mut records = RECORDS;
        records[0] = Record::new(0x0000_0010, 5);
        assert_ne!(HashIndex::new(&BUCKETS, &records).digest(), digest);
    }
}
