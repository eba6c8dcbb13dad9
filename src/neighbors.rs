//! Neighbor tables — precomputed previous/next links per axis and the
//! other-side partner of every hash.
//!
//! Links are computed once from the legal ranges and verified before the
//! table set is published. A missing link is `None`, never a magic hash.

use detector_id_dict::Axis;

use crate::error::BuildInconsistency;
use crate::hash::HashIndex;
use crate::layout::FieldSchema;
use crate::range::{Direction, Extreme, MultiRange};
use crate::IdentifierHash;

/// One navigable axis of a detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisSpec {
    pub axis: Axis,
    /// Field stepped along the axis.
    pub field: usize,
    /// Shallower field whose boundary is crossed when `field` runs out.
    pub container: Option<usize>,
}

/// Field pairing the two sides of a double-sided element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairingSpec {
    pub field: usize,
    /// An element without partner voids the build.
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AxisLinks {
    previous: Vec<Option<IdentifierHash>>,
    next: Vec<Option<IdentifierHash>>,
}

impl AxisLinks {
    fn get(&self, direction: Direction) -> &[Option<IdentifierHash>] {
        match direction {
            Direction::Previous => &self.previous,
            Direction::Next => &self.next,
        }
    }
}

/// Precomputed neighbors of every hash of one context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborIndex {
    links: [Option<AxisLinks>; 3],
    other_side: Option<Vec<Option<IdentifierHash>>>,
}

impl NeighborIndex {
    /// Compute and verify the links of every hash in `index`.
    ///
    /// `range` should be the range `index` was built from. A neighbor that is
    /// legal in `range` but missing from `index` fails with
    /// [`BuildInconsistency::UnhashedNeighbor`].
    pub fn build(
        schema: &FieldSchema,
        range: &MultiRange,
        index: &HashIndex,
        axes: &[AxisSpec],
        pairing: Option<PairingSpec>,
    ) -> Result<Self, BuildInconsistency> {
        let mut neighbors = Self::default();
        // An empty index, or one deeper than `schema`, has no links.
        let Some(tuples) = index.context().and_then(|context| {
            index
                .identifiers()
                .iter()
                .map(|&id| schema.unpack_tuple(id, context))
                .collect::<Option<Vec<_>>>()
        }) else {
            return Ok(neighbors);
        };

        for spec in axes {
            let mut links = AxisLinks {
                previous: Vec::with_capacity(tuples.len()),
                next: Vec::with_capacity(tuples.len()),
            };
            for tuple in &tuples {
                links.previous.push(Self::link(
                    schema,
                    range,
                    index,
                    spec,
                    tuple,
                    Direction::Previous,
                )?);
                links
                    .next
                    .push(Self::link(schema, range, index, spec, tuple, Direction::Next)?);
            }
            neighbors.links[spec.axis.index()] = Some(links);
        }

        if let Some(pairing) = pairing {
            let mut partners = Vec::with_capacity(tuples.len());
            for tuple in &tuples {
                partners.push(Self::partner(schema, range, index, pairing, tuple)?);
            }
            neighbors.other_side = Some(partners);
        }

        neighbors.verify()?;
        Ok(neighbors)
    }

    fn link(
        schema: &FieldSchema,
        range: &MultiRange,
        index: &HashIndex,
        spec: &AxisSpec,
        tuple: &[i32],
        direction: Direction,
    ) -> Result<Option<IdentifierHash>, BuildInconsistency> {
        let Some(target) = neighbor_tuple(range, spec, tuple, direction) else {
            return Ok(None);
        };
        lookup(schema, index, tuple, target, || {
            let way = match direction {
                Direction::Previous => "previous",
                Direction::Next => "next",
            };
            format!("{} {}", spec.axis, way)
        })
        .map(Some)
    }

    fn partner(
        schema: &FieldSchema,
        range: &MultiRange,
        index: &HashIndex,
        pairing: PairingSpec,
        tuple: &[i32],
    ) -> Result<Option<IdentifierHash>, BuildInconsistency> {
        let candidates = range.partners(pairing.field, tuple);
        match candidates.len() {
            0 if pairing.required => Err(BuildInconsistency::MissingPartner {
                tuple: tuple.to_vec(),
            }),
            0 => Ok(None),
            1 => {
                let mut target = tuple.to_vec();
                target[pairing.field] = candidates[0];
                lookup(schema, index, tuple, target, || "other side".to_string()).map(Some)
            }
            _ => Err(BuildInconsistency::AmbiguousPartner {
                tuple: tuple.to_vec(),
                candidates,
            }),
        }
    }

    /// Check that every link can be walked back.
    pub fn verify(&self) -> Result<(), BuildInconsistency> {
        for axis in Axis::ALL {
            let Some(links) = &self.links[axis.index()] else {
                continue;
            };
            for (direction, back) in [
                (Direction::Next, Direction::Previous),
                (Direction::Previous, Direction::Next),
            ] {
                let forward = links.get(direction);
                let reverse = links.get(back);
                for (i, link) in forward.iter().enumerate() {
                    let Some(neighbor) = link else { continue };
                    if reverse.get(neighbor.index()).copied().flatten()
                        != Some(IdentifierHash::new(i as u32))
                    {
                        return Err(BuildInconsistency::AsymmetricNeighbor {
                            axis,
                            hash: i as u32,
                            neighbor: neighbor.value(),
                        });
                    }
                }
            }
        }

        if let Some(partners) = &self.other_side {
            for (i, partner) in partners.iter().enumerate() {
                let Some(partner) = partner else { continue };
                if partners.get(partner.index()).copied().flatten()
                    != Some(IdentifierHash::new(i as u32))
                {
                    return Err(BuildInconsistency::BrokenOtherSide {
                        hash: i as u32,
                        partner: partner.value(),
                    });
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn supports(&self, axis: Axis) -> bool {
        self.links[axis.index()].is_some()
    }

    pub fn has_other_side(&self) -> bool {
        self.other_side.is_some()
    }

    pub fn previous(&self, hash: IdentifierHash, axis: Axis) -> Option<IdentifierHash> {
        self.neighbor(hash, axis, Direction::Previous)
    }

    pub fn next(&self, hash: IdentifierHash, axis: Axis) -> Option<IdentifierHash> {
        self.neighbor(hash, axis, Direction::Next)
    }

    pub fn neighbor(
        &self,
        hash: IdentifierHash,
        axis: Axis,
        direction: Direction,
    ) -> Option<IdentifierHash> {
        let links = self.links[axis.index()].as_ref()?;
        links.get(direction).get(hash.index()).copied().flatten()
    }

    pub fn other_side(&self, hash: IdentifierHash) -> Option<IdentifierHash> {
        self.other_side.as_ref()?.get(hash.index()).copied().flatten()
    }
}

/// Nearest legal tuple along `spec`, crossing container boundaries.
///
/// Stepping past the edge of `spec.field` moves the container one legal value
/// on and lands on the far end of the field there: the largest value when
/// going backward, the smallest when going forward.
fn neighbor_tuple(
    range: &MultiRange,
    spec: &AxisSpec,
    tuple: &[i32],
    direction: Direction,
) -> Option<Vec<i32>> {
    if let Some(value) = range.step(spec.field, tuple, direction, &[]) {
        let mut target = tuple.to_vec();
        target[spec.field] = value;
        return Some(target);
    }

    let container = spec.container?;
    let landing = match direction {
        Direction::Previous => Extreme::Max,
        Direction::Next => Extreme::Min,
    };
    let mut probe = tuple.to_vec();
    loop {
        probe[container] = range.step(container, &probe, direction, &[spec.field])?;
        if let Some(value) = range.extreme(spec.field, &probe, landing) {
            probe[spec.field] = value;
            return Some(probe);
        }
    }
}

/// Hash of the `to` tuple reached from `from`.
fn lookup(
    schema: &FieldSchema,
    index: &HashIndex,
    from: &[i32],
    to: Vec<i32>,
    relation: impl FnOnce() -> String,
) -> Result<IdentifierHash, BuildInconsistency> {
    index
        .hash_of(schema.pack_tuple(&to))
        .ok_or_else(|| BuildInconsistency::UnhashedNeighbor {
            relation: relation(),
            from: from.to_vec(),
            to,
        })
}
