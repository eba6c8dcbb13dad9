//! Per-detector facade over the shared tables.

use std::sync::Arc;

use detector_id_dict::{Axis, Checks};

use crate::codec::IdentifierCodec;
use crate::error::IdError;
use crate::layout::FieldSchema;
use crate::registry::{CodecTables, DetectorTables};
use crate::{Context, Identifier, IdentifierHash};

/// Identifier operations for one detector.
///
/// Cheap to clone; all state lives in the shared [`CodecTables`]. Contexts
/// deeper than the schema yield `None` (or `false`).
#[derive(Clone, Debug)]
pub struct DetectorIdHelper {
    tables: Arc<CodecTables>,
    detector: usize,
    checks: Checks,
}

impl DetectorIdHelper {
    pub fn new(tables: Arc<CodecTables>, name: &str) -> Result<Self, IdError> {
        let detector = tables.detector_index(name)?;
        let checks = tables.checks();
        Ok(Self {
            tables,
            detector,
            checks,
        })
    }

    /// Same helper with a different validation mode.
    pub fn with_checks(mut self, checks: Checks) -> Self {
        self.checks = checks;
        self
    }

    pub fn name(&self) -> &str {
        self.detector().name()
    }

    pub fn tables(&self) -> &Arc<CodecTables> {
        &self.tables
    }

    #[inline]
    pub fn detector(&self) -> &DetectorTables {
        &self.tables.detectors()[self.detector]
    }

    #[inline]
    pub fn schema(&self) -> &FieldSchema {
        self.tables.schema()
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    /// Context whose deepest field is `name`.
    pub fn context(&self, name: &str) -> Result<Context, IdError> {
        self.schema().context(name)
    }

    /// Context of the precomputed hash index and neighbor tables.
    #[inline]
    pub fn primary_context(&self) -> Context {
        self.detector().primary()
    }

    pub fn codec(&self) -> IdentifierCodec<'_> {
        IdentifierCodec::new(self.name(), self.schema(), self.detector().deepest())
    }

    /// Pack the detector prefix followed by `values`.
    ///
    /// The number of values selects the context.
    pub fn make_id(&self, values: &[i32]) -> Result<Identifier, IdError> {
        let mut tuple = self.detector().prefix().to_vec();
        tuple.extend_from_slice(values);
        self.codec().make(&tuple, self.checks)
    }

    /// Hash at the primary context. Deeper fields of `id` are ignored.
    pub fn hash_of(&self, id: Identifier) -> Option<IdentifierHash> {
        let id = self.schema().truncate(id, self.primary_context())?;
        self.detector().hashes().hash_of(id)
    }

    /// Hash at any context.
    ///
    /// Contexts other than the primary one are ranked on the fly.
    pub fn hash_in(&self, id: Identifier, context: Context) -> Option<IdentifierHash> {
        if context == self.primary_context() {
            return self.hash_of(id);
        }
        let range = self.detector().range(context)?;
        let tuple = self.schema().unpack_tuple(id, context)?;
        if !range.matches(&tuple) {
            return None;
        }
        u32::try_from(range.cardinality_up_to(&tuple))
            .ok()
            .map(IdentifierHash::new)
    }

    pub fn identifier_of(&self, hash: IdentifierHash, context: Context) -> Option<Identifier> {
        if context == self.primary_context() {
            return self.detector().hashes().identifier_of(hash);
        }
        let tuple = self.detector().range(context)?.nth(hash.value() as u64)?;
        Some(self.schema().pack_tuple(&tuple))
    }

    /// Number of hashes at `context`.
    pub fn hash_max(&self, context: Context) -> usize {
        if context == self.primary_context() {
            return self.detector().hashes().len();
        }
        self.detector()
            .range(context)
            .map_or(0, |r| usize::try_from(r.cardinality()).unwrap_or(usize::MAX))
    }

    /// Value of the field called `name`.
    pub fn field(&self, id: Identifier, name: &str) -> Result<i32, IdError> {
        let index = self.schema().require(name)?;
        Ok(self.schema().unpack(index, id))
    }

    /// Value of field number `index`; `None` past the deepest field.
    #[inline]
    pub fn field_at(&self, id: Identifier, index: usize) -> Option<i32> {
        (index < self.schema().len()).then(|| self.schema().unpack(index, id))
    }

    /// Values of fields `0..=context`, or `None` if the schema has no such context.
    pub fn fields(&self, id: Identifier, context: Context) -> Option<Vec<i32>> {
        self.schema().unpack_tuple(id, context)
    }

    /// `id` with every field deeper than `context` cleared.
    pub fn parent(&self, id: Identifier, context: Context) -> Option<Identifier> {
        self.schema().truncate(id, context)
    }

    /// True if `id` is a legal identifier of this detector at `context`.
    pub fn is_valid(&self, id: Identifier, context: Context) -> bool {
        let Some(range) = self.detector().range(context) else {
            return false;
        };
        let Some(tuple) = self.schema().unpack_tuple(id, context) else {
            return false;
        };
        self.schema().truncate(id, context) == Some(id) && range.matches(&tuple)
    }

    pub fn neighbor_prev(&self, hash: IdentifierHash, axis: Axis) -> Option<IdentifierHash> {
        self.detector().neighbors().previous(hash, axis)
    }

    pub fn neighbor_next(&self, hash: IdentifierHash, axis: Axis) -> Option<IdentifierHash> {
        self.detector().neighbors().next(hash, axis)
    }

    pub fn other_side(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.detector().neighbors().other_side(hash)
    }
}
