//! Legal field ranges — unions of Cartesian blocks.
//!
//! A [`MultiRange`] holds the legal tuples of one detector at one depth. Each
//! [`RangeBlock`] is a product of per-field domains taken from one dictionary
//! region. Blocks of one range never share a tuple, so counts and ranks add up
//! across blocks.

use std::fmt;

use detector_id_dict::{Dictionary, DomainDesc};

use crate::error::BuildInconsistency;

/// Legal values of one field inside a block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldDomain {
    /// Inclusive range.
    Bounded { min: i32, max: i32 },
    /// Sorted, deduplicated, non-empty.
    Enumerated(Vec<i32>),
}

impl FieldDomain {
    pub const fn single(value: i32) -> Self {
        Self::Bounded {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        match self {
            Self::Bounded { min, max } => *min <= value && value <= *max,
            Self::Enumerated(values) => values.binary_search(&value).is_ok(),
        }
    }

    pub fn cardinality(&self) -> u64 {
        match self {
            Self::Bounded { min, max } => (*max as i64 - *min as i64 + 1) as u64,
            Self::Enumerated(values) => values.len() as u64,
        }
    }

    /// Number of legal values strictly below `value`.
    pub fn count_below(&self, value: i32) -> u64 {
        match self {
            Self::Bounded { min, max } => {
                (value as i64 - *min as i64).clamp(0, *max as i64 - *min as i64 + 1) as u64
            }
            Self::Enumerated(values) => values.partition_point(|&v| v < value) as u64,
        }
    }

    /// Largest legal value strictly below `value`.
    pub fn previous(&self, value: i32) -> Option<i32> {
        match self {
            Self::Bounded { min, max } => (value > *min).then(|| (value - 1).min(*max)),
            Self::Enumerated(values) => {
                let idx = values.partition_point(|&v| v < value);
                idx.checked_sub(1).map(|i| values[i])
            }
        }
    }

    /// Smallest legal value strictly above `value`.
    pub fn next(&self, value: i32) -> Option<i32> {
        match self {
            Self::Bounded { min, max } => (value < *max).then(|| (value + 1).max(*min)),
            Self::Enumerated(values) => {
                let idx = values.partition_point(|&v| v <= value);
                values.get(idx).copied()
            }
        }
    }

    pub fn min(&self) -> i32 {
        match self {
            Self::Bounded { min, .. } => *min,
            Self::Enumerated(values) => values[0],
        }
    }

    pub fn max(&self) -> i32 {
        match self {
            Self::Bounded { max, .. } => *max,
            Self::Enumerated(values) => values[values.len() - 1],
        }
    }

    /// The `n`-th legal value in ascending order; `n < cardinality()`.
    #[inline]
    pub fn nth_value(&self, n: u64) -> i32 {
        match self {
            Self::Bounded { min, .. } => (*min as i64 + n as i64) as i32,
            Self::Enumerated(values) => values[n as usize],
        }
    }

    /// All legal values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.cardinality()).map(|n| self.nth_value(n))
    }

    /// True if some value is legal in both domains.
    pub fn intersects(&self, other: &FieldDomain) -> bool {
        match (self, other) {
            (Self::Bounded { min: a, max: b }, Self::Bounded { min: c, max: d }) => a <= d && c <= b,
            (Self::Enumerated(values), other) | (other, Self::Enumerated(values)) => {
                values.iter().any(|&v| other.contains(v))
            }
        }
    }

    /// Values legal in both domains; `None` if there are none.
    pub fn intersection(&self, other: &FieldDomain) -> Option<FieldDomain> {
        match (self, other) {
            (Self::Bounded { min: a, max: b }, Self::Bounded { min: c, max: d }) => {
                let (min, max) = ((*a).max(*c), (*b).min(*d));
                (min <= max).then_some(Self::Bounded { min, max })
            }
            (Self::Enumerated(values), other) | (other, Self::Enumerated(values)) => {
                let common: Vec<i32> = values.iter().copied().filter(|&v| other.contains(v)).collect();
                (!common.is_empty()).then_some(Self::Enumerated(common))
            }
        }
    }

    /// Values of `self` not legal in `other`, as disjoint domains.
    pub fn difference(&self, other: &FieldDomain) -> Vec<FieldDomain> {
        match self {
            Self::Enumerated(values) => {
                let rest: Vec<i32> = values.iter().copied().filter(|&v| !other.contains(v)).collect();
                if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![Self::Enumerated(rest)]
                }
            }
            Self::Bounded { min, max } => {
                let cuts: Vec<(i64, i64)> = match other {
                    Self::Bounded { min: lo, max: hi } => vec![(*lo as i64, *hi as i64)],
                    Self::Enumerated(values) => values.iter().map(|&v| (v as i64, v as i64)).collect(),
                };
                // Runs between the cuts, which come sorted.
                let mut pieces = Vec::new();
                let mut start = *min as i64;
                for (lo, hi) in cuts {
                    if hi < start {
                        continue;
                    }
                    if lo > *max as i64 {
                        break;
                    }
                    if lo > start {
                        pieces.push(Self::Bounded {
                            min: start as i32,
                            max: (lo - 1) as i32,
                        });
                    }
                    start = hi + 1;
                }
                if start <= *max as i64 {
                    pieces.push(Self::Bounded {
                        min: start as i32,
                        max: *max,
                    });
                }
                pieces
            }
        }
    }
}

impl From<&DomainDesc> for FieldDomain {
    fn from(desc: &DomainDesc) -> Self {
        match desc {
            DomainDesc::Range { min, max } => Self::Bounded {
                min: *min,
                max: *max,
            },
            DomainDesc::Values(values) => Self::Enumerated(values.clone()),
        }
    }
}

impl fmt::Display for FieldDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded { min, max } if min == max => write!(f, "{}", min),
            Self::Bounded { min, max } => write!(f, "{}..={}", min, max),
            Self::Enumerated(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}}}", parts.join(","))
            }
        }
    }
}

/// One Cartesian block: a domain per field, shallow to deep.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeBlock {
    domains: Vec<FieldDomain>,
}

impl RangeBlock {
    pub fn new(domains: Vec<FieldDomain>) -> Self {
        Self { domains }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.domains.len()
    }

    pub fn domains(&self) -> &[FieldDomain] {
        &self.domains
    }

    #[inline]
    pub fn domain(&self, field: usize) -> &FieldDomain {
        &self.domains[field]
    }

    pub fn matches(&self, tuple: &[i32]) -> bool {
        tuple.len() == self.depth() && self.matches_prefix(tuple)
    }

    /// True if `tuple` is the start of some tuple of this block.
    pub fn matches_prefix(&self, tuple: &[i32]) -> bool {
        tuple.len() <= self.depth()
            && tuple
                .iter()
                .zip(&self.domains)
                .all(|(&v, d)| d.contains(v))
    }

    /// Match every field except `field` and the `free` ones.
    fn matches_except(&self, tuple: &[i32], field: usize, free: &[usize]) -> bool {
        tuple.len() == self.depth()
            && tuple
                .iter()
                .zip(&self.domains)
                .enumerate()
                .all(|(i, (&v, d))| i == field || free.contains(&i) || d.contains(v))
    }

    /// Number of tuples in the block.
    pub fn cardinality(&self) -> u64 {
        self.suffix_cardinality(0)
    }

    /// Number of completions of a prefix of length `from`.
    fn suffix_cardinality(&self, from: usize) -> u64 {
        self.domains[from..]
            .iter()
            .fold(1u64, |acc, d| acc.saturating_mul(d.cardinality()))
    }

    /// Number of block tuples lexicographically below `tuple`.
    pub fn count_before(&self, tuple: &[i32]) -> u64 {
        let mut count = 0u64;
        for (i, d) in self.domains.iter().enumerate() {
            let Some(&value) = tuple.get(i) else {
                break;
            };
            count += d.count_below(value) * self.suffix_cardinality(i + 1);
            if !d.contains(value) {
                break;
            }
        }
        count
    }

    /// True if both blocks contain a common tuple.
    pub fn overlaps(&self, other: &RangeBlock) -> bool {
        self.depth() == other.depth()
            && self
                .domains
                .iter()
                .zip(&other.domains)
                .all(|(a, b)| a.intersects(b))
    }

    /// Tuples of `self` that are not in `other`, as disjoint blocks.
    pub fn difference(&self, other: &RangeBlock) -> Vec<RangeBlock> {
        if !self.overlaps(other) {
            return vec![self.clone()];
        }
        // Piece `i` agrees with `other` on the fields before `i` and leaves it at `i`.
        let mut pieces = Vec::new();
        let mut shared = Vec::with_capacity(self.depth());
        for (i, (a, b)) in self.domains.iter().zip(&other.domains).enumerate() {
            for rest in a.difference(b) {
                let mut domains = shared.clone();
                domains.push(rest);
                domains.extend_from_slice(&self.domains[i + 1..]);
                pieces.push(Self::new(domains));
            }
            let Some(common) = a.intersection(b) else {
                break;
            };
            shared.push(common);
        }
        pieces
    }

    /// Keep the first `depth` fields; `None` if the block is shallower.
    pub fn truncated(&self, depth: usize) -> Option<Self> {
        (self.depth() >= depth).then(|| Self::new(self.domains[..depth].to_vec()))
    }

    /// Pin the leading fields to `prefix`, or `None` if the block excludes it.
    pub fn restricted(&self, prefix: &[i32]) -> Option<Self> {
        let n = prefix.len().min(self.depth());
        if !self.matches_prefix(&prefix[..n]) {
            return None;
        }
        let mut domains = self.domains.clone();
        for (d, &v) in domains.iter_mut().zip(&prefix[..n]) {
            *d = FieldDomain::single(v);
        }
        Some(Self::new(domains))
    }
}

impl fmt::Display for RangeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.domains.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Search direction along one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extreme {
    Min,
    Max,
}

/// Union of disjoint blocks, all of the same depth.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiRange {
    depth: usize,
    blocks: Vec<RangeBlock>,
}

impl MultiRange {
    /// Build a range of `depth` fields.
    ///
    /// Blocks are truncated to `depth` and shallower blocks dropped. Truncated
    /// blocks may share tuples; they are split so each tuple is counted once.
    /// Blocks declared at exactly `depth` must not partially overlap.
    pub fn from_blocks(
        depth: usize,
        blocks: impl IntoIterator<Item = RangeBlock>,
    ) -> Result<Self, BuildInconsistency> {
        let mut declared: Vec<RangeBlock> = Vec::new();
        let mut kept: Vec<RangeBlock> = Vec::new();
        for block in blocks {
            let exact = block.depth() == depth;
            let Some(block) = block.truncated(depth) else {
                continue;
            };
            if exact {
                if declared.contains(&block) {
                    continue;
                }
                if let Some(existing) = declared.iter().find(|d| d.overlaps(&block)) {
                    return Err(BuildInconsistency::OverlappingRegions {
                        depth,
                        first: existing.to_string(),
                        second: block.to_string(),
                    });
                }
                declared.push(block.clone());
            }

            let mut pieces = vec![block];
            for k in &kept {
                pieces = pieces.iter().flat_map(|p| p.difference(k)).collect();
            }
            kept.extend(pieces);
        }
        Ok(Self {
            depth,
            blocks: kept,
        })
    }

    /// Range of `depth` fields over every region of the dictionary.
    pub fn from_dictionary(dictionary: &Dictionary, depth: usize) -> Result<Self, BuildInconsistency> {
        Self::from_blocks(
            depth,
            dictionary.regions().iter().map(|region| {
                RangeBlock::new(region.domains.iter().map(FieldDomain::from).collect())
            }),
        )
    }

    /// Only the tuples starting with `prefix`.
    pub fn restricted(&self, prefix: &[i32]) -> Self {
        Self {
            depth: self.depth,
            blocks: self
                .blocks
                .iter()
                .filter_map(|b| b.restricted(prefix))
                .collect(),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn blocks(&self) -> &[RangeBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True if `tuple` is a legal tuple of full depth.
    pub fn matches(&self, tuple: &[i32]) -> bool {
        self.blocks.iter().any(|b| b.matches(tuple))
    }

    /// True if `tuple` starts some legal tuple.
    pub fn matches_prefix(&self, tuple: &[i32]) -> bool {
        self.blocks.iter().any(|b| b.matches_prefix(tuple))
    }

    /// Total number of legal tuples.
    pub fn cardinality(&self) -> u64 {
        self.blocks
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.cardinality()))
    }

    /// Lexicographic rank of `tuple`: the number of legal tuples below it.
    ///
    /// For a legal tuple this is its hash at this depth.
    pub fn cardinality_up_to(&self, tuple: &[i32]) -> u64 {
        self.blocks.iter().map(|b| b.count_before(tuple)).sum()
    }

    /// The legal tuple of rank `rank`; inverse of [`cardinality_up_to`](Self::cardinality_up_to).
    pub fn nth(&self, mut rank: u64) -> Option<Vec<i32>> {
        if rank >= self.cardinality() {
            return None;
        }
        let mut prefix = Vec::with_capacity(self.depth);
        for field in 0..self.depth {
            let live: Vec<&RangeBlock> = self
                .blocks
                .iter()
                .filter(|b| b.matches_prefix(&prefix))
                .collect();
            let mut values: Vec<i32> = live.iter().flat_map(|b| b.domain(field).values()).collect();
            values.sort_unstable();
            values.dedup();

            let mut chosen = None;
            for value in values {
                let count: u64 = live
                    .iter()
                    .filter(|b| b.domain(field).contains(value))
                    .map(|b| b.suffix_cardinality(field + 1))
                    .sum();
                if rank < count {
                    chosen = Some(value);
                    break;
                }
                rank -= count;
            }
            prefix.push(chosen?);
        }
        Some(prefix)
    }

    /// Nearest legal value of `field` below `tuple[field]`, other fields fixed.
    pub fn previous(&self, field: usize, tuple: &[i32]) -> Option<i32> {
        self.step(field, tuple, Direction::Previous, &[])
    }

    /// Nearest legal value of `field` above `tuple[field]`, other fields fixed.
    pub fn next(&self, field: usize, tuple: &[i32]) -> Option<i32> {
        self.step(field, tuple, Direction::Next, &[])
    }

    /// Nearest legal value of `field` in `direction`.
    ///
    /// Fields listed in `free` are not held fixed. `None` means `tuple[field]`
    /// is already at the edge of its legal values.
    pub fn step(
        &self,
        field: usize,
        tuple: &[i32],
        direction: Direction,
        free: &[usize],
    ) -> Option<i32> {
        let current = tuple[field];
        let candidates = self
            .blocks
            .iter()
            .filter(|b| b.matches_except(tuple, field, free))
            .filter_map(|b| match direction {
                Direction::Previous => b.domain(field).previous(current),
                Direction::Next => b.domain(field).next(current),
            });
        match direction {
            Direction::Previous => candidates.max(),
            Direction::Next => candidates.min(),
        }
    }

    /// Smallest or largest legal value of `field`, other fields fixed.
    pub fn extreme(&self, field: usize, tuple: &[i32], which: Extreme) -> Option<i32> {
        let candidates = self
            .blocks
            .iter()
            .filter(|b| b.matches_except(tuple, field, &[]))
            .map(|b| b.domain(field));
        match which {
            Extreme::Min => candidates.map(FieldDomain::min).min(),
            Extreme::Max => candidates.map(FieldDomain::max).max(),
        }
    }

    /// Legal values of `field` other than `tuple[field]`, other fields fixed.
    pub fn partners(&self, field: usize, tuple: &[i32]) -> Vec<i32> {
        let current = tuple[field];
        let mut values: Vec<i32> = self
            .blocks
            .iter()
            .filter(|b| b.matches_except(tuple, field, &[]))
            .flat_map(|b| b.domain(field).values())
            .filter(|&v| v != current)
            .collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// Every legal tuple, block by block.
    pub fn tuples(&self) -> Tuples<'_> {
        Tuples {
            blocks: &self.blocks,
            block: 0,
            cursor: vec![0; self.depth],
        }
    }
}

/// Iterator over the tuples of a [`MultiRange`].
#[derive(Clone, Debug)]
pub struct Tuples<'a> {
    blocks: &'a [RangeBlock],
    block: usize,
    cursor: Vec<u64>,
}

impl Iterator for Tuples<'_> {
    type Item = Vec<i32>;

    fn next(&mut self) -> Option<Vec<i32>> {
        let blocks = self.blocks;
        let block = blocks.get(self.block)?;
        let tuple = block
            .domains
            .iter()
            .zip(&self.cursor)
            .map(|(d, &n)| d.nth_value(n))
            .collect();

        // Odometer step; a full carry moves on to the next block.
        let mut field = self.cursor.len();
        loop {
            if field == 0 {
                self.block += 1;
                break;
            }
            field -= 1;
            self.cursor[field] += 1;
            if self.cursor[field] < block.domains[field].cardinality() {
                break;
            }
            self.cursor[field] = 0;
        }
        Some(tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(min: i32, max: i32) -> FieldDomain {
        FieldDomain::Bounded { min, max }
    }

    fn block(domains: &[FieldDomain]) -> RangeBlock {
        RangeBlock::new(domains.to_vec())
    }

    /// station 0 has plates 0..=1, station 2 has plates 0..=2 (station 1 absent).
    fn uneven() -> MultiRange {
        MultiRange::from_blocks(
            2,
            [
                block(&[FieldDomain::single(0), bounded(0, 1)]),
                block(&[FieldDomain::single(2), bounded(0, 2)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn domain_navigation() {
        let b = bounded(2, 5);
        assert_eq!(b.previous(2), None);
        assert_eq!(b.previous(4), Some(3));
        assert_eq!(b.previous(9), Some(5));
        assert_eq!(b.next(5), None);
        assert_eq!(b.next(0), Some(2));
        assert_eq!(b.count_below(0), 0);
        assert_eq!(b.count_below(4), 2);
        assert_eq!(b.count_below(10), 4);

        let e = FieldDomain::Enumerated(vec![-1, 1]);
        assert_eq!(e.next(-1), Some(1));
        assert_eq!(e.previous(1), Some(-1));
        assert_eq!(e.previous(-1), None);
        assert_eq!(e.count_below(0), 1);
        assert!(!e.contains(0));
        assert_eq!(e.values().collect::<Vec<_>>(), vec![-1, 1]);
    }

    #[test]
    fn domain_intersection() {
        assert!(bounded(0, 3).intersects(&bounded(3, 5)));
        assert!(!bounded(0, 2).intersects(&bounded(3, 5)));
        assert!(FieldDomain::Enumerated(vec![1, 4]).intersects(&bounded(3, 5)));
        assert!(!bounded(2, 3).intersects(&FieldDomain::Enumerated(vec![1, 4])));
    }

    #[test]
    fn cardinality_sums_blocks() {
        assert_eq!(uneven().cardinality(), 5);
    }

    #[test]
    fn matching() {
        let r = uneven();
        assert!(r.matches(&[2, 2]));
        assert!(!r.matches(&[0, 2]));
        assert!(!r.matches(&[1, 0]));
        assert!(!r.matches(&[2]));
        assert!(r.matches_prefix(&[2]));
        assert!(!r.matches_prefix(&[1]));
    }

    #[test]
    fn rank_and_nth_agree() {
        let r = uneven();
        let all: Vec<Vec<i32>> = r.tuples().collect();
        assert_eq!(all.len(), 5);
        for (rank, tuple) in all.iter().enumerate() {
            assert_eq!(r.cardinality_up_to(tuple), rank as u64);
            assert_eq!(r.nth(rank as u64).as_ref(), Some(tuple));
        }
        assert_eq!(r.nth(5), None);
    }

    #[test]
    fn rank_interleaves_blocks() {
        // Blocks that alternate in lexicographic order still rank globally.
        let r = MultiRange::from_blocks(
            2,
            [
                block(&[FieldDomain::Enumerated(vec![0, 2]), bounded(0, 1)]),
                block(&[FieldDomain::single(1), FieldDomain::single(5)]),
            ],
        )
        .unwrap();
        assert_eq!(r.cardinality_up_to(&[0, 1]), 1);
        assert_eq!(r.cardinality_up_to(&[1, 5]), 2);
        assert_eq!(r.cardinality_up_to(&[2, 0]), 3);
        assert_eq!(r.nth(2), Some(vec![1, 5]));
        assert_eq!(r.nth(4), Some(vec![2, 1]));
    }

    #[test]
    fn stepping_holds_siblings() {
        let r = uneven();
        assert_eq!(r.next(1, &[0, 0]), Some(1));
        assert_eq!(r.next(1, &[0, 1]), None);
        assert_eq!(r.previous(1, &[2, 0]), None);
        // Station stepping skips the missing station 1 ...
        assert_eq!(r.next(0, &[0, 1]), Some(2));
        // ... but not when the plate does not exist in the target station.
        assert_eq!(r.previous(0, &[2, 2]), None);
        // Freeing the plate makes station 0 reachable again.
        assert_eq!(r.step(0, &[2, 2], Direction::Previous, &[1]), Some(0));
    }

    #[test]
    fn extremes_and_partners() {
        let r = uneven();
        assert_eq!(r.extreme(1, &[2, 0], Extreme::Max), Some(2));
        assert_eq!(r.extreme(1, &[0, 0], Extreme::Min), Some(0));
        assert_eq!(r.extreme(1, &[1, 0], Extreme::Min), None);
        assert_eq!(r.partners(1, &[0, 0]), vec![1]);
        assert_eq!(r.partners(1, &[2, 1]), vec![0, 2]);
    }

    #[test]
    fn identical_blocks_merge_on_truncation() {
        let r = MultiRange::from_blocks(
            2,
            [
                block(&[FieldDomain::single(0), bounded(0, 1), FieldDomain::single(0)]),
                block(&[FieldDomain::single(0), bounded(0, 1), FieldDomain::single(1)]),
                block(&[FieldDomain::single(0)]),
            ],
        )
        .unwrap();
        assert_eq!(r.blocks().len(), 1);
        assert_eq!(r.cardinality(), 2);
    }

    #[test]
    fn domain_difference() {
        assert_eq!(bounded(0, 5).difference(&bounded(2, 3)), vec![bounded(0, 1), bounded(4, 5)]);
        assert_eq!(bounded(0, 5).difference(&bounded(-3, 9)), Vec::<FieldDomain>::new());
        assert_eq!(bounded(0, 2).difference(&bounded(4, 9)), vec![bounded(0, 2)]);
        assert_eq!(
            bounded(0, 6).difference(&FieldDomain::Enumerated(vec![-2, 0, 3, 4])),
            vec![bounded(1, 2), bounded(5, 6)]
        );
        assert_eq!(
            FieldDomain::Enumerated(vec![1, 3, 5]).difference(&bounded(2, 3)),
            vec![FieldDomain::Enumerated(vec![1, 5])]
        );
        assert_eq!(bounded(1, 4).intersection(&bounded(3, 8)), Some(bounded(3, 4)));
        assert_eq!(bounded(1, 2).intersection(&bounded(3, 8)), None);
    }

    #[test]
    fn block_difference_is_disjoint() {
        let a = block(&[bounded(0, 2), bounded(0, 3)]);
        let b = block(&[FieldDomain::single(1), bounded(1, 2)]);
        let pieces = a.difference(&b);
        let r = MultiRange::from_blocks(2, pieces.clone()).unwrap();
        assert_eq!(r.cardinality(), 12 - 2);
        assert!(!r.matches(&[1, 1]));
        assert!(r.matches(&[1, 3]));
        for (i, p) in pieces.iter().enumerate() {
            assert!(pieces[i + 1..].iter().all(|q| !p.overlaps(q)));
        }
    }

    #[test]
    fn nested_domains_split_on_truncation() {
        // Plate 1 has pmts 0 and 1, plate 0 only pmt 0.
        let blocks = [
            block(&[FieldDomain::single(0), bounded(0, 1), FieldDomain::single(0)]),
            block(&[FieldDomain::single(0), FieldDomain::single(1), FieldDomain::single(1)]),
        ];
        let plates = MultiRange::from_blocks(2, blocks.clone()).unwrap();
        assert_eq!(plates.cardinality(), 2);
        assert_eq!(plates.tuples().collect::<Vec<_>>(), vec![vec![0, 0], vec![0, 1]]);
        assert_eq!(plates.cardinality_up_to(&[0, 1]), 1);
        assert_eq!(plates.next(1, &[0, 0]), Some(1));

        let pmts = MultiRange::from_blocks(3, blocks).unwrap();
        assert_eq!(pmts.cardinality(), 3);
        assert_eq!(pmts.cardinality_up_to(&[0, 1, 1]), 2);
        assert_eq!(pmts.partners(2, &[0, 1, 0]), vec![1]);
        assert_eq!(pmts.partners(2, &[0, 0, 0]), Vec::<i32>::new());
    }

    #[test]
    fn partial_overlap_is_rejected() {
        let err = MultiRange::from_blocks(
            2,
            [
                block(&[FieldDomain::single(0), bounded(0, 1)]),
                block(&[FieldDomain::single(0), bounded(1, 2)]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BuildInconsistency::OverlappingRegions { depth: 2, .. }));
        assert!(err.to_string().contains("[0, 0..=1]"), "{}", err);
    }

    #[test]
    fn restriction_pins_prefix() {
        let r = uneven().restricted(&[2]);
        assert_eq!(r.cardinality(), 3);
        assert!(r.matches(&[2, 1]));
        assert!(!r.matches(&[0, 1]));
    }

    #[test]
    fn tuples_enumerate_each_block() {
        let r = uneven();
        let all: Vec<Vec<i32>> = r.tuples().collect();
        assert_eq!(
            all,
            vec![vec![0, 0], vec![0, 1], vec![2, 0], vec![2, 1], vec![2, 2]]
        );
    }
}
