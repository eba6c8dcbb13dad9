//! Identifier dictionary descriptions for detector-id.
//!
//! This crate provides tools for:
//! - Parsing identifier dictionaries written in TOML
//! - Resolving named labels (`part = "Veto"`) to integer field values
//! - Structural validation of fields, regions and detector declarations
//! - Deriving a version tag when the dictionary does not carry one
//!
//! # Dictionary format
//!
//! ```toml
//! name = "Scintillator"
//! version = "scintillator-00"
//!
//! [checks]
//! mode = "strict"        # or "fast"
//! on_violation = "warn"  # or "error"
//!
//! [[field]]
//! name = "part"
//! labels = { Veto = 0, Trigger = 1 }
//!
//! [[field]]
//! name = "station"
//!
//! [[field]]
//! name = "plate"
//!
//! [[region]]
//! part = "Veto"
//! station = { min = 0, max = 1 }
//! plate = [0, 1]
//!
//! [[detector]]
//! name = "Veto"
//! prefix = { part = "Veto" }
//! hash_level = "plate"
//! axes = [{ axis = "z", field = "plate", container = "station" }]
//! ```
//!
//! Fields are listed shallow to deep. A region is one Cartesian block of legal
//! values and must name a contiguous run of fields starting at the first one.
//!
//! # Version tag
//!
//! The version tag decides whether identifier tables need rebuilding. When the
//! dictionary omits `version`, the tag is `"<name>@<fingerprint>"` where the
//! fingerprint is an FNV-1a hash over the resolved content, so two textually
//! different but equivalent dictionaries share a tag.

mod toml_parser;

pub use toml_parser::{
    Axis, AxisDesc, AxisSource, CheckMode, Checks, DetectorDesc, DetectorSource, Dictionary,
    DictionaryError, DictionarySource, DomainDesc, DomainSource, FieldDesc, FieldSource,
    OnViolation, RegionDesc, ValueSource,
};

use std::path::Path;

/// FNV-1a 64-bit hash — simple, fast, const-compatible.
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Load and validate a dictionary file.
///
/// Shorthand for [`Dictionary::from_file`].
pub fn load(path: impl AsRef<Path>) -> Result<Dictionary, DictionaryError> {
    Dictionary::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_basic_sanity() {
        assert_ne!(fnv1a_64(b"hello"), fnv1a_64(b"world"));
        assert_eq!(fnv1a_64(b"hello"), fnv1a_64(b"hello"));
        // Offset basis for the empty input.
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
    }
}
