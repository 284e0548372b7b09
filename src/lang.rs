// SPDX-License-Identifier: PMPL-1.0-or-later

//! Language codes.
//!
//! A [`LangCode`] is a lowercase ISO 639-1 two-letter code stored inline as
//! two bytes, so providers and the registry can carry it by value without
//! touching an allocator. Codes parsed from text (CLI flags, config files,
//! catalogs) are checked against the ISO 639-1 list; codes built with
//! [`LangCode::literal`] in generated firmware tables are checked for shape
//! only, at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Two-letter lowercase ISO 639-1 language code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LangCode([u8; 2]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LangCodeError {
    #[error("language code {0:?} must be exactly two letters")]
    WrongLength(String),
    #[error("language code {0:?} must be lowercase ASCII")]
    NotLowercase(String),
    #[error("{0:?} is not an ISO 639-1 language code")]
    Unknown(String),
}

impl LangCode {
    /// Build a code from two lowercase ASCII letters.
    pub const fn from_ascii(bytes: [u8; 2]) -> Option<Self> {
        if bytes[0].is_ascii_lowercase() && bytes[1].is_ascii_lowercase() {
            Some(LangCode(bytes))
        } else {
            None
        }
    }

    /// Build a code from a literal, failing compilation when used in a
    /// `const`/`static` initializer with a malformed code.
    ///
    /// ```
    /// use flashlang::LangCode;
    /// const DE: LangCode = LangCode::literal("de");
    /// assert_eq!(DE.as_str(), "de");
    /// ```
    pub const fn literal(code: &str) -> Self {
        let bytes = code.as_bytes();
        if bytes.len() != 2 {
            panic!("language code must be two letters");
        }
        match Self::from_ascii([bytes[0], bytes[1]]) {
            Some(code) => code,
            None => panic!("language code must be lowercase ASCII"),
        }
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are lowercase ASCII by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    pub const fn as_bytes(&self) -> [u8; 2] {
        self.0
    }

    /// English name, for the languages this project ships tables for and a
    /// handful of common neighbours.
    pub fn language_name(&self) -> Option<&'static str> {
        match self.as_str() {
            "cs" => Some("Czech"),
            "de" => Some("German"),
            "en" => Some("English"),
            "es" => Some("Spanish"),
            "fr" => Some("French"),
            "it" => Some("Italian"),
            "pl" => Some("Polish"),
            "ja" => Some("Japanese"),
            "nl" => Some("Dutch"),
            "pt" => Some("Portuguese"),
            "sk" => Some("Slovak"),
            "sv" => Some("Swedish"),
            "uk" => Some("Ukrainian"),
            _ => None,
        }
    }

    /// Name of the language written in that language, as shown in the
    /// printer's language selection menu.
    pub fn native_name(&self) -> Option<&'static str> {
        match self.as_str() {
            "cs" => Some("Čeština"),
            "de" => Some("Deutsch"),
            "en" => Some("English"),
            "es" => Some("Español"),
            "fr" => Some("Français"),
            "it" => Some("Italiano"),
            "pl" => Some("Polski"),
            "ja" => Some("日本語"),
            "nl" => Some("Nederlands"),
            "pt" => Some("Português"),
            "sk" => Some("Slovenčina"),
            "sv" => Some("Svenska"),
            "uk" => Some("Українська"),
            _ => None,
        }
    }
}

/// Whether `code` appears in ISO 639-1. Case-sensitive: codes are lowercase.
pub fn is_iso639_1(code: &str) -> bool {
    ISO_639_1.binary_search(&code).is_ok()
}

// Sorted; searched with `binary_search`.
const ISO_639_1: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg",
    "bh", "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv",
    "cy", "da", "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi",
    "fj", "fo", "fr", "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr",
    "ht", "hu", "hy", "hz", "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja",
    "jv", "ka", "kg", "ki", "kj", "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw",
    "ky", "la", "lb", "lg", "li", "ln", "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml",
    "mn", "mr", "ms", "mt", "my", "na", "nb", "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv",
    "ny", "oc", "oj", "om", "or", "os", "pa", "pi", "pl", "ps", "pt", "qu", "rm", "rn", "ro",
    "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk", "sl", "sm", "sn", "so", "sq", "sr",
    "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr",
    "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo", "wa", "wo", "xh", "yi",
    "yo", "za", "zh", "zu",
];

impl FromStr for LangCode {
    type Err = LangCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(LangCodeError::WrongLength(s.to_string()));
        }
        let code = LangCode::from_ascii([bytes[0], bytes[1]])
            .ok_or_else(|| LangCodeError::NotLowercase(s.to_string()))?;
        if !is_iso639_1(s) {
            return Err(LangCodeError::Unknown(s.to_string()));
        }
        Ok(code)
    }
}

impl TryFrom<String> for LangCode {
    type Error = LangCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LangCode> for String {
    fn from(code: LangCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LangCode({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_table_is_sorted() {
        assert!(ISO_639_1.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parses_shipped_languages() {
        for code in ["cs", "de", "es", "fr", "it", "pl"] {
            let parsed: LangCode = code.parse().expect("should parse");
            assert_eq!(parsed.as_str(), code);
            assert!(parsed.native_name().is_some(), "{code} has a native name");
        }
    }

    #[test]
    fn rejects_bad_codes() {
        assert_eq!(
            "deu".parse::<LangCode>(),
            Err(LangCodeError::WrongLength("deu".into()))
        );
        assert_eq!(
            "DE".parse::<LangCode>(),
            Err(LangCodeError::NotLowercase("DE".into()))
        );
        assert_eq!(
            "xx".parse::<LangCode>(),
            Err(LangCodeError::Unknown("xx".into()))
        );
    }

    #[test]
    fn literal_skips_iso_check() {
        // Shape-only: generated tables may carry private-use codes.
        assert_eq!(LangCode::literal("xx").as_str(), "xx");
        assert_eq!(LangCode::from_ascii(*b"X1"), None);
    }

    #[test]
    fn serde_as_plain_string() {
        let code = LangCode::literal("pl");
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"pl\"");
        let back: LangCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<LangCode>("\"PL\"").is_err());
    }

    #[test]
    fn names() {
        let cs = LangCode::literal("cs");
        assert_eq!(cs.language_name(), Some("Czech"));
        assert_eq!(cs.native_name(), Some("Čeština"));
        assert_eq!(LangCode::literal("zu").language_name(), None);
        assert_eq!(format!("{cs:?}"), "LangCode(\"cs\")");
    }
}
