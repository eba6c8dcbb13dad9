//! Dense hash index — sorted legal identifiers of one context.
//!
//! The hash of an identifier is its position in the ascending list of every
//! legal identifier at that context, so hashes are dense in `[0, len)` and
//! follow the lexicographic order of the field tuples.

use std::collections::HashMap;

use detector_id_dict::fnv1a_64;
use zerocopy::IntoBytes;

use crate::error::BuildInconsistency;
use crate::layout::FieldSchema;
use crate::range::MultiRange;
use crate::{Context, Identifier, IdentifierHash};

/// Bidirectional `Identifier` ↔ `IdentifierHash` map for one context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashIndex {
    context: Option<Context>,
    ids: Vec<Identifier>,
}

impl HashIndex {
    /// Enumerate and pack every tuple of `range`.
    ///
    /// Two tuples packing to the same identifier void the build.
    pub fn build(schema: &FieldSchema, range: &MultiRange) -> Result<Self, BuildInconsistency> {
        let count = range.cardinality();
        if count > u32::MAX as u64 {
            return Err(BuildInconsistency::TooManyEntries { count });
        }

        let mut seen: HashMap<Identifier, Vec<i32>> = HashMap::with_capacity(count as usize);
        for tuple in range.tuples() {
            let id = schema.pack_tuple(&tuple);
            if let Some(first) = seen.get(&id) {
                return Err(BuildInconsistency::DuplicateIdentifier {
                    first: first.clone(),
                    second: tuple,
                    identifier: id,
                });
            }
            seen.insert(id, tuple);
        }

        let mut ids: Vec<Identifier> = seen.into_keys().collect();
        ids.sort_unstable();

        Ok(Self {
            context: range.depth().checked_sub(1).map(Context::new),
            ids,
        })
    }

    /// Context of the indexed identifiers; `None` for an empty range.
    pub fn context(&self) -> Option<Context> {
        self.context
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn hash_of(&self, id: Identifier) -> Option<IdentifierHash> {
        self.ids
            .binary_search(&id)
            .ok()
            .map(|i| IdentifierHash::new(i as u32))
    }

    pub fn identifier_of(&self, hash: IdentifierHash) -> Option<Identifier> {
        self.ids.get(hash.index()).copied()
    }

    /// `(hash, identifier)` pairs in hash order.
    pub fn iter(&self) -> impl Iterator<Item = (IdentifierHash, Identifier)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (IdentifierHash::new(i as u32), id))
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.ids
    }

    /// The sorted identifiers as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.ids.as_bytes()
    }

    /// FNV-1a over [`as_bytes`](Self::as_bytes); equal for equal hash spaces.
    pub fn fingerprint(&self) -> u64 {
        fnv1a_64(self.as_bytes())
    }
}
