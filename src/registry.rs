//! Table registry — build-once identifier tables and their atomic publication.
//!
//! [`CodecTables`] bundles everything derived from one dictionary version:
//! the field schema and, per detector, the legal ranges at every depth, the
//! primary hash index and the neighbor tables. A build either succeeds as a
//! whole or leaves nothing behind.
//!
//! [`TableRegistry`] holds the published table set. Readers take an
//! `Arc<CodecTables>` snapshot without locking; a reload only rebuilds when the
//! dictionary version tag changed.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use detector_id_dict::{fnv1a_64, Checks, DetectorDesc, Dictionary};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{BuildInconsistency, IdError};
use crate::hash::HashIndex;
use crate::helper::DetectorIdHelper;
use crate::layout::FieldSchema;
use crate::neighbors::{AxisSpec, NeighborIndex, PairingSpec};
use crate::range::{FieldDomain, MultiRange, RangeBlock};
use crate::Context;

/// Derived tables of one detector.
#[derive(Clone, Debug)]
pub struct DetectorTables {
    name: String,
    prefix: Vec<i32>,
    primary: Context,
    /// `contexts[d]` holds the legal tuples of fields `0..=d`.
    contexts: Vec<MultiRange>,
    hashes: HashIndex,
    neighbors: NeighborIndex,
}

impl DetectorTables {
    pub fn build(
        desc: &DetectorDesc,
        schema: &FieldSchema,
        dictionary: &Dictionary,
    ) -> Result<Self, IdError> {
        let invalid = |message: String| IdError::InvalidDetector {
            detector: desc.name.clone(),
            message,
        };
        let inconsistent = |source: BuildInconsistency| IdError::Build {
            detector: desc.name.clone(),
            source,
        };

        // 1. Resolve field names
        let primary = schema.context(&desc.hash_level)?;
        if primary.field_count() < desc.prefix.len() {
            return Err(invalid(format!(
                "hash level '{}' is shallower than the detector prefix",
                desc.hash_level
            )));
        }

        let mut axes = Vec::with_capacity(desc.axes.len());
        for a in &desc.axes {
            let field = schema.require(&a.field)?;
            let container = a.container.as_deref().map(|c| schema.require(c)).transpose()?;
            if field > primary.depth() {
                return Err(invalid(format!(
                    "{} axis field '{}' is deeper than hash level '{}'",
                    a.axis, a.field, desc.hash_level
                )));
            }
            if let Some(c) = container
                && c >= field
            {
                return Err(invalid(format!(
                    "{} axis container '{}' must be shallower than '{}'",
                    a.axis,
                    schema.field(c).name(),
                    a.field
                )));
            }
            axes.push(AxisSpec {
                axis: a.axis,
                field,
                container,
            });
        }

        let pairing = match &desc.other_side {
            Some(name) => {
                let field = schema.require(name)?;
                if field > primary.depth() {
                    return Err(invalid(format!(
                        "other side field '{}' is deeper than hash level '{}'",
                        name, desc.hash_level
                    )));
                }
                Some(PairingSpec {
                    field,
                    required: desc.require_pairing,
                })
            }
            None => None,
        };

        // 2. Legal ranges at every depth, restricted to the detector prefix
        let blocks: Vec<RangeBlock> = dictionary
            .regions()
            .iter()
            .map(|region| RangeBlock::new(region.domains.iter().map(FieldDomain::from).collect()))
            .filter_map(|block| block.restricted(&desc.prefix))
            .collect();
        let contexts = (1..=schema.len())
            .map(|depth| MultiRange::from_blocks(depth, blocks.iter().cloned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(inconsistent)?;

        let range = &contexts[primary.depth()];
        if range.is_empty() {
            return Err(inconsistent(BuildInconsistency::EmptyDetector {
                level: desc.hash_level.clone(),
            }));
        }

        // 3. Primary hash index and neighbors
        let hashes = HashIndex::build(schema, range).map_err(inconsistent)?;
        let neighbors =
            NeighborIndex::build(schema, range, &hashes, &axes, pairing).map_err(inconsistent)?;

        debug!(
            detector = %desc.name,
            level = %desc.hash_level,
            hashes = hashes.len(),
            axes = axes.len(),
            paired = pairing.is_some(),
            "built detector tables"
        );

        Ok(Self {
            name: desc.name.clone(),
            prefix: desc.prefix.clone(),
            primary,
            contexts,
            hashes,
            neighbors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed values of the leading fields.
    pub fn prefix(&self) -> &[i32] {
        &self.prefix
    }

    /// Context of the materialized hash index.
    #[inline]
    pub fn primary(&self) -> Context {
        self.primary
    }

    /// Legal tuples at `context`; `None` past the deepest field.
    #[inline]
    pub fn range(&self, context: Context) -> Option<&MultiRange> {
        self.contexts.get(context.depth())
    }

    /// Legal tuples of full schema depth.
    pub fn deepest(&self) -> &MultiRange {
        &self.contexts[self.contexts.len() - 1]
    }

    pub fn hashes(&self) -> &HashIndex {
        &self.hashes
    }

    pub fn neighbors(&self) -> &NeighborIndex {
        &self.neighbors
    }
}

/// Immutable tables for every detector of one dictionary version.
#[derive(Clone, Debug)]
pub struct CodecTables {
    name: String,
    version: String,
    checks: Checks,
    schema: FieldSchema,
    detectors: Vec<DetectorTables>,
    fingerprint: u64,
}

impl CodecTables {
    /// Build with the dictionary's own `[checks]` settings.
    pub fn build(dictionary: &Dictionary) -> Result<Self, IdError> {
        Self::build_with(dictionary, dictionary.checks)
    }

    /// Build with `checks` as the default validation for helpers.
    pub fn build_with(dictionary: &Dictionary, checks: Checks) -> Result<Self, IdError> {
        let mut required: Vec<&str> = Vec::new();
        for d in dictionary.detectors() {
            required.push(&d.hash_level);
            required.extend(d.axes.iter().map(|a| a.field.as_str()));
            required.extend(d.axes.iter().filter_map(|a| a.container.as_deref()));
            required.extend(d.other_side.as_deref());
        }
        let schema = FieldSchema::resolve(dictionary, &required)?;

        let detectors = dictionary
            .detectors()
            .iter()
            .map(|desc| DetectorTables::build(desc, &schema, dictionary))
            .collect::<Result<Vec<_>, _>>()?;

        let digest: Vec<u8> = detectors
            .iter()
            .flat_map(|d| d.hashes.fingerprint().to_le_bytes())
            .collect();

        Ok(Self {
            name: dictionary.name.clone(),
            version: dictionary.version.clone(),
            checks,
            schema,
            detectors,
            fingerprint: fnv1a_64(&digest),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version tag of the source dictionary.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn detectors(&self) -> &[DetectorTables] {
        &self.detectors
    }

    pub fn detector(&self, name: &str) -> Option<&DetectorTables> {
        self.detectors.iter().find(|d| d.name == name)
    }

    pub fn detector_index(&self, name: &str) -> Result<usize, IdError> {
        self.detectors
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| IdError::UnknownDetector {
                dictionary: self.name.clone(),
                detector: name.to_string(),
            })
    }

    /// Combined fingerprint of every detector's hash space.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Helper for one detector, sharing these tables.
    pub fn helper(self: &Arc<Self>, name: &str) -> Result<DetectorIdHelper, IdError> {
        DetectorIdHelper::new(Arc::clone(self), name)
    }
}

/// Publishes one [`CodecTables`] at a time.
#[derive(Debug, Default)]
pub struct TableRegistry {
    current: ArcSwapOption<CodecTables>,
    /// Serializes builds; readers never take it.
    build_lock: Mutex<()>,
    checks: Option<Checks>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose builds override the dictionaries' `[checks]`.
    pub fn with_checks(checks: Checks) -> Self {
        Self {
            checks: Some(checks),
            ..Self::default()
        }
    }

    /// The published table set, if any.
    pub fn current(&self) -> Option<Arc<CodecTables>> {
        self.current.load_full()
    }

    /// Build and publish tables for `dictionary`.
    ///
    /// Nothing is rebuilt when the published tables carry the same version
    /// tag. A failed build leaves the published tables in place.
    pub fn load(&self, dictionary: &Dictionary) -> Result<Arc<CodecTables>, IdError> {
        let _guard = self.build_lock.lock();

        if let Some(current) = self.current.load_full()
            && current.version() == dictionary.version
        {
            debug!(
                dictionary = %dictionary.name,
                version = %dictionary.version,
                "identifier tables up to date"
            );
            return Ok(current);
        }

        let checks = self.checks.unwrap_or(dictionary.checks);
        let tables = Arc::new(CodecTables::build_with(dictionary, checks)?);
        let previous = self.current.swap(Some(Arc::clone(&tables)));

        info!(
            dictionary = %tables.name(),
            version = %tables.version(),
            fingerprint = %format!("{:016x}", tables.fingerprint()),
            detectors = tables.detectors().len(),
            layout_changed = previous.is_none_or(|p| p.fingerprint() != tables.fingerprint()),
            "published identifier tables"
        );
        Ok(tables)
    }

    /// Helper from the published tables.
    pub fn helper(&self, name: &str) -> Result<DetectorIdHelper, IdError> {
        self.current().ok_or(IdError::NotLoaded)?.helper(name)
    }
}
