//! Typed helpers for the bundled scintillator and strip tracker dictionaries.
//!
//! These are thin wrappers over [`DetectorIdHelper`] with the field indices
//! resolved once, so call sites read `station(id)` instead of looking fields
//! up by name.

use std::sync::Arc;

use detector_id_dict::{Axis, Dictionary};

use crate::error::IdError;
use crate::helper::DetectorIdHelper;
use crate::registry::CodecTables;
use crate::{Context, Identifier, IdentifierHash};

/// Veto, VetoNu, Trigger and Preshower.
pub const SCINTILLATOR_DICTIONARY: &str = include_str!("../dictionaries/scintillator.toml");

/// SCT strip tracker.
pub const TRACKER_DICTIONARY: &str = include_str!("../dictionaries/tracker.toml");

/// Tables built from [`SCINTILLATOR_DICTIONARY`].
pub fn scintillator_tables() -> Result<Arc<CodecTables>, IdError> {
    let dictionary = Dictionary::from_str(SCINTILLATOR_DICTIONARY)?;
    Ok(Arc::new(CodecTables::build(&dictionary)?))
}

/// Tables built from [`TRACKER_DICTIONARY`].
pub fn tracker_tables() -> Result<Arc<CodecTables>, IdError> {
    let dictionary = Dictionary::from_str(TRACKER_DICTIONARY)?;
    Ok(Arc::new(CodecTables::build(&dictionary)?))
}

/// Make sure the detector is hashed at the level the typed helper expects.
fn expect_primary(helper: &DetectorIdHelper, level: &str) -> Result<Context, IdError> {
    let context = helper.context(level)?;
    if context != helper.primary_context() {
        return Err(IdError::InvalidDetector {
            detector: helper.name().to_string(),
            message: format!("expected hash level '{}'", level),
        });
    }
    Ok(context)
}

// =============================================================================
// Scintillator
// =============================================================================

/// Station / plate / pmt identifiers of one scintillator detector.
#[derive(Clone, Debug)]
pub struct ScintillatorId {
    helper: DetectorIdHelper,
    station: usize,
    plate: Context,
    pmt: Context,
}

impl ScintillatorId {
    pub fn new(tables: &Arc<CodecTables>, detector: &str) -> Result<Self, IdError> {
        let helper = tables.helper(detector)?;
        let station = helper.schema().require("station")?;
        let plate = expect_primary(&helper, "plate")?;
        let pmt = helper.context("pmt")?;
        Ok(Self {
            helper,
            station,
            plate,
            pmt,
        })
    }

    pub fn helper(&self) -> &DetectorIdHelper {
        &self.helper
    }

    pub fn plate_id(&self, station: i32, plate: i32) -> Result<Identifier, IdError> {
        self.helper.make_id(&[station, plate])
    }

    pub fn pmt_id(&self, station: i32, plate: i32, pmt: i32) -> Result<Identifier, IdError> {
        self.helper.make_id(&[station, plate, pmt])
    }

    pub fn pmt_id_from_plate(&self, plate_id: Identifier, pmt: i32) -> Result<Identifier, IdError> {
        let mut tuple = self.helper.fields(plate_id, self.plate).ok_or_else(|| IdError::FieldCount {
            given: self.plate.field_count(),
            max: self.helper.schema().len(),
        })?;
        tuple.push(pmt);
        self.helper.codec().make(&tuple, self.helper.checks())
    }

    #[inline]
    pub fn plate_id_from_pmt(&self, pmt_id: Identifier) -> Option<Identifier> {
        self.helper.parent(pmt_id, self.plate)
    }

    #[inline]
    pub fn station(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.station, id)
    }

    #[inline]
    pub fn plate(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.plate.depth(), id)
    }

    #[inline]
    pub fn pmt(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.pmt.depth(), id)
    }

    pub fn plate_hash(&self, id: Identifier) -> Option<IdentifierHash> {
        self.helper.hash_of(id)
    }

    pub fn pmt_hash(&self, id: Identifier) -> Option<IdentifierHash> {
        self.helper.hash_in(id, self.pmt)
    }

    pub fn plate_hash_max(&self) -> usize {
        self.helper.hash_max(self.plate)
    }

    pub fn pmt_hash_max(&self) -> usize {
        self.helper.hash_max(self.pmt)
    }

    pub fn plate_id_from_hash(&self, hash: IdentifierHash) -> Option<Identifier> {
        self.helper.identifier_of(hash, self.plate)
    }

    pub fn next_in_z(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_next(hash, Axis::Z)
    }

    pub fn prev_in_z(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_prev(hash, Axis::Z)
    }
}

// =============================================================================
// Strip tracker
// =============================================================================

/// Wafer and strip identifiers of the SCT.
#[derive(Clone, Debug)]
pub struct SctId {
    helper: DetectorIdHelper,
    station: usize,
    layer: usize,
    phi_module: usize,
    eta_module: usize,
    wafer: Context,
    strip: Context,
}

impl SctId {
    pub fn new(tables: &Arc<CodecTables>, detector: &str) -> Result<Self, IdError> {
        let helper = tables.helper(detector)?;
        let schema = helper.schema();
        let station = schema.require("station")?;
        let layer = schema.require("layer")?;
        let phi_module = schema.require("phi_module")?;
        let eta_module = schema.require("eta_module")?;
        let wafer = expect_primary(&helper, "side")?;
        let strip = helper.context("strip")?;
        Ok(Self {
            helper,
            station,
            layer,
            phi_module,
            eta_module,
            wafer,
            strip,
        })
    }

    pub fn helper(&self) -> &DetectorIdHelper {
        &self.helper
    }

    pub fn wafer_id(
        &self,
        station: i32,
        layer: i32,
        phi_module: i32,
        eta_module: i32,
        side: i32,
    ) -> Result<Identifier, IdError> {
        self.helper
            .make_id(&[station, layer, phi_module, eta_module, side])
    }

    pub fn strip_id(
        &self,
        station: i32,
        layer: i32,
        phi_module: i32,
        eta_module: i32,
        side: i32,
        strip: i32,
    ) -> Result<Identifier, IdError> {
        self.helper
            .make_id(&[station, layer, phi_module, eta_module, side, strip])
    }

    pub fn strip_id_from_wafer(&self, wafer_id: Identifier, strip: i32) -> Result<Identifier, IdError> {
        let mut tuple = self.helper.fields(wafer_id, self.wafer).ok_or_else(|| IdError::FieldCount {
            given: self.wafer.field_count(),
            max: self.helper.schema().len(),
        })?;
        tuple.push(strip);
        self.helper.codec().make(&tuple, self.helper.checks())
    }

    #[inline]
    pub fn wafer_id_from_strip(&self, strip_id: Identifier) -> Option<Identifier> {
        self.helper.parent(strip_id, self.wafer)
    }

    pub fn station(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.station, id)
    }

    pub fn layer(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.layer, id)
    }

    pub fn phi_module(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.phi_module, id)
    }

    pub fn eta_module(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.eta_module, id)
    }

    pub fn side(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.wafer.depth(), id)
    }

    pub fn strip(&self, id: Identifier) -> i32 {
        self.helper.schema().unpack(self.strip.depth(), id)
    }

    pub fn wafer_hash(&self, id: Identifier) -> Option<IdentifierHash> {
        self.helper.hash_of(id)
    }

    pub fn strip_hash(&self, id: Identifier) -> Option<IdentifierHash> {
        self.helper.hash_in(id, self.strip)
    }

    pub fn wafer_hash_max(&self) -> usize {
        self.helper.hash_max(self.wafer)
    }

    pub fn strip_hash_max(&self) -> usize {
        self.helper.hash_max(self.strip)
    }

    pub fn wafer_id_from_hash(&self, hash: IdentifierHash) -> Option<Identifier> {
        self.helper.identifier_of(hash, self.wafer)
    }

    pub fn next_in_phi(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_next(hash, Axis::Phi)
    }

    pub fn prev_in_phi(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_prev(hash, Axis::Phi)
    }

    pub fn next_in_eta(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_next(hash, Axis::Eta)
    }

    pub fn prev_in_eta(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_prev(hash, Axis::Eta)
    }

    pub fn next_in_z(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_next(hash, Axis::Z)
    }

    pub fn prev_in_z(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.neighbor_prev(hash, Axis::Z)
    }

    /// The wafer on the other side of the same module.
    pub fn other_side(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.helper.other_side(hash)
    }
}
