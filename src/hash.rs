// SPDX-License-Identifier: PMPL-1.0-or-later

//! Source-string hashing.
//!
//! Every lookup key is the 32-bit FNV-1a hash of the exact UTF-8 bytes of
//! the untranslated source string. The generator and every run-time caller
//! must use these functions; a different hash silently turns every lookup
//! into a miss.
//!
//! Both functions are `const`, so firmware can key its labels at compile
//! time:
//!
//! ```
//! use flashlang::hash::source_hash;
//! const PARKING: u32 = source_hash("Parking");
//! assert_eq!(PARKING, 0x70f7_1707);
//! ```

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Hash a source string.
pub const fn source_hash(source: &str) -> u32 {
    source_hash_bytes(source.as_bytes())
}

/// Hash raw source bytes. Identical to [`source_hash`] for UTF-8 input.
pub const fn source_hash_bytes(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}
