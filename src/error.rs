//! Error types for identifier construction and table builds.

use detector_id_dict::{Axis, DictionaryError};
use thiserror::Error;

use crate::Identifier;

/// Errors raised by the codec, the table build and the helpers.
#[derive(Debug, Error)]
pub enum IdError {
    /// The dictionary description could not be loaded.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// A field required by a detector is absent from the dictionary.
    #[error("dictionary '{dictionary}' has no field named '{field}'")]
    MissingField { dictionary: String, field: String },

    #[error("dictionary '{dictionary}' has no detector named '{detector}'")]
    UnknownDetector { dictionary: String, detector: String },

    /// A detector declaration does not fit the field schema.
    #[error("detector '{detector}' is misdeclared: {message}")]
    InvalidDetector { detector: String, message: String },

    /// An explicit bit width is too small for the legal values.
    #[error("field '{field}' declares {bits} bits but its values span {span}")]
    FieldTooNarrow { field: String, bits: u32, span: u64 },

    #[error("fields need {bits} bits, more than the 64-bit identifier holds")]
    LayoutTooWide { bits: u32 },

    #[error("expected between 1 and {max} field values, got {given}")]
    FieldCount { given: usize, max: usize },

    /// A strict check rejected a tuple.
    #[error(transparent)]
    RangeViolation(#[from] RangeViolation),

    /// No table set has been published yet.
    #[error("no identifier tables loaded")]
    NotLoaded,

    /// The tables for a detector are inconsistent; the whole build is void.
    #[error("cannot build identifier tables for '{detector}': {source}")]
    Build {
        detector: String,
        #[source]
        source: BuildInconsistency,
    },
}

/// A field tuple outside the legal ranges of its detector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detector}: {tuple:?} is outside the legal ranges at the '{level}' level")]
pub struct RangeViolation {
    pub detector: String,
    pub tuple: Vec<i32>,
    /// Name of the deepest field in `tuple`.
    pub level: String,
}

/// Build-time inconsistencies. Any of these voids the table set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildInconsistency {
    #[error("tuples {first:?} and {second:?} both pack to {identifier}")]
    DuplicateIdentifier {
        first: Vec<i32>,
        second: Vec<i32>,
        identifier: Identifier,
    },

    #[error("regions {first} and {second} overlap at depth {depth}")]
    OverlappingRegions {
        depth: usize,
        first: String,
        second: String,
    },

    #[error("no legal identifiers at the '{level}' level")]
    EmptyDetector { level: String },

    #[error("{count} identifiers do not fit a 32-bit hash")]
    TooManyEntries { count: u64 },

    /// A neighbor tuple legal in the range but absent from the hash index the
    /// links are built for.
    #[error("{relation} neighbor of {from:?} is {to:?}, which has no hash")]
    UnhashedNeighbor {
        relation: String,
        from: Vec<i32>,
        to: Vec<i32>,
    },

    #[error("{axis} links are not symmetric: {hash} -> {neighbor} has no way back")]
    AsymmetricNeighbor { axis: Axis, hash: u32, neighbor: u32 },

    #[error("{tuple:?} has no other side")]
    MissingPartner { tuple: Vec<i32> },

    #[error("{tuple:?} has several other-side candidates {candidates:?}")]
    AmbiguousPartner { tuple: Vec<i32>, candidates: Vec<i32> },

    #[error("other side of {hash} is {partner}, whose other side is not {hash}")]
    BrokenOtherSide { hash: u32, partner: u32 },
}
