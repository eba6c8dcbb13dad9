//! # Detector Identifier Codec (detector-id)
//!
//! Turns hierarchical detector-element coordinates (station/plate/pmt,
//! station/layer/phi_module/eta_module/side/strip, ...) into compact
//! bit-packed identifiers, assigns every legal identifier a dense hash and
//! precomputes neighbor tables along the z, phi, eta and "other side" axes.
//! Everything is driven by a dictionary description, so one engine serves
//! structurally different detectors.
//!
//! ## Identifier layout
//!
//! An [`Identifier`] is a `u64`. Fields are packed from the most significant
//! bit downward in dictionary order, so numeric order equals the
//! lexicographic order of the field tuple:
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬────────────┐
//! │ subdet   │ part     │ station  │ plate    │ pmt      │ (unused)   │
//! │ field 0  │ field 1  │ field 2  │ field 3  │ field 4  │ zeros      │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴────────────┘
//!  bit 63                                                         bit 0
//! ```
//!
//! Truncating an identifier to a shallower context (pmt → plate) zeroes the
//! deeper fields.
//!
//! ## Build once, share everywhere
//!
//! ```ignore
//! use std::sync::Arc;
//! use detector_id::{Axis, CodecTables, Dictionary};
//!
//! let dict = Dictionary::from_file("scintillator.toml")?;
//! let tables = Arc::new(CodecTables::build(&dict)?);
//! let veto = tables.helper("Veto")?;
//!
//! let plate = veto.make_id(&[0, 1])?; // station 0, plate 1
//! let hash = veto.hash_of(plate).unwrap();
//! let downstream = veto.neighbor_next(hash, Axis::Z); // station 1, plate 0
//! ```
//!
//! [`CodecTables`] is immutable after the build. [`TableRegistry`] publishes
//! a new table set atomically whenever the dictionary version tag changes.

pub mod codec;
pub mod detectors;
pub mod error;
pub mod hash;
pub mod helper;
pub mod layout;
pub mod neighbors;
pub mod range;
pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub use codec::IdentifierCodec;
pub use detector_id_dict::{
    Axis, CheckMode, Checks, Dictionary, DictionaryError, OnViolation,
};
pub use detectors::{
    scintillator_tables, tracker_tables, ScintillatorId, SctId, SCINTILLATOR_DICTIONARY,
    TRACKER_DICTIONARY,
};
pub use error::{BuildInconsistency, IdError, RangeViolation};
pub use hash::HashIndex;
pub use helper::DetectorIdHelper;
pub use layout::{Field, FieldSchema, IDENTIFIER_BITS};
pub use neighbors::{AxisSpec, NeighborIndex, PairingSpec};
pub use range::{Direction, Extreme, FieldDomain, MultiRange, RangeBlock, Tuples};
pub use registry::{CodecTables, DetectorTables, TableRegistry};

/// Compact bit-packed address of a detector element.
///
/// The bit layout is stable for one dictionary version.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, IntoBytes, FromBytes, Immutable,
    KnownLayout, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Identifier(u64);

impl Identifier {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:#018x})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Dense zero-based index of an identifier within one context.
///
/// Only meaningful for the table set that produced it; never persist it.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, IntoBytes, FromBytes, Immutable,
    KnownLayout, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct IdentifierHash(u32);

impl IdentifierHash {
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for IdentifierHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentifierHash({})", self.0)
    }
}

impl fmt::Display for IdentifierHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nesting depth of an identifier: the index of its deepest significant field.
///
/// Each context is its own hash space (plate-level hashes and pmt-level
/// hashes are unrelated numbers).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(usize);

impl Context {
    #[inline]
    pub const fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// Index of the deepest field.
    #[inline]
    pub const fn depth(self) -> usize {
        self.0
    }

    /// Number of fields significant at this context.
    #[inline]
    pub const fn field_count(self) -> usize {
        self.0 + 1
    }
}
