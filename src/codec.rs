//! Tuple packing with optional range checks.

use detector_id_dict::{CheckMode, Checks, OnViolation};
use tracing::warn;

use crate::error::{IdError, RangeViolation};
use crate::layout::FieldSchema;
use crate::range::MultiRange;
use crate::{Context, Identifier};

/// Packs field tuples for one detector.
///
/// `range` is the detector's deepest legal range; tuples of any length up to
/// the schema depth are checked against its prefixes.
#[derive(Clone, Copy, Debug)]
pub struct IdentifierCodec<'a> {
    detector: &'a str,
    schema: &'a FieldSchema,
    range: &'a MultiRange,
}

impl<'a> IdentifierCodec<'a> {
    pub fn new(detector: &'a str, schema: &'a FieldSchema, range: &'a MultiRange) -> Self {
        Self {
            detector,
            schema,
            range,
        }
    }

    pub fn schema(&self) -> &'a FieldSchema {
        self.schema
    }

    /// Pack `tuple`; its length selects the context.
    ///
    /// Under [`CheckMode::Strict`] an out-of-range tuple is logged and packed
    /// anyway ([`OnViolation::Warn`]) or rejected ([`OnViolation::Error`]).
    pub fn make(&self, tuple: &[i32], checks: Checks) -> Result<Identifier, IdError> {
        if tuple.is_empty() || tuple.len() > self.schema.len() {
            return Err(IdError::FieldCount {
                given: tuple.len(),
                max: self.schema.len(),
            });
        }

        if checks.mode == CheckMode::Strict && !self.range.matches_prefix(tuple) {
            let violation = RangeViolation {
                detector: self.detector.to_string(),
                tuple: tuple.to_vec(),
                level: self.schema.field(tuple.len() - 1).name().to_string(),
            };
            match checks.on_violation {
                OnViolation::Warn => warn!("{}", violation),
                OnViolation::Error => return Err(violation.into()),
            }
        }

        Ok(self.schema.pack_tuple(tuple))
    }

    /// Drop every field deeper than `context`.
    #[inline]
    pub fn to_parent_context(&self, id: Identifier, context: Context) -> Option<Identifier> {
        self.schema.truncate(id, context)
    }

    pub fn fields(&self, id: Identifier, context: Context) -> Option<Vec<i32>> {
        self.schema.unpack_tuple(id, context)
    }
}
