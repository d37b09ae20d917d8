use std::collections::BTreeMap;

use itertools::Itertools;

use crate::common::SignificantRead;

/// Count of each nucleotide at one offset
pub type BaseCounts = BTreeMap<u8, u32>;

///////////////////////////////
/// Per-offset nucleotide counts over a set of reads. Offsets without any
/// counted read are never present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NucleotideTally {
    counts: BTreeMap<usize, BaseCounts>,
}

impl NucleotideTally {
    pub fn new() -> Self {
        Self::default()
    }

    ///////////////////////////////
    /// Tally of the bases a single read carries at its significant offsets
    pub fn from_read<R: SignificantRead>(read: &R) -> Self {
        let mut tally = Self::new();
        tally.add_read(read);
        tally
    }

    #[inline(always)]
    pub fn add(&mut self, offset: usize, base: u8) {
        *self.counts.entry(offset).or_default().entry(base).or_insert(0) += 1;
    }

    pub fn add_read<R: SignificantRead>(&mut self, read: &R) {
        for &offset in read.significant_offsets() {
            self.add(offset, read.base(offset));
        }
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.counts.contains_key(&offset)
    }

    /// Has this base been seen at the offset
    #[inline(always)]
    pub fn contains(&self, offset: usize, base: u8) -> bool {
        self.counts
            .get(&offset)
            .map_or(false, |bases| bases.contains_key(&base))
    }

    pub fn get(&self, offset: usize) -> Option<&BaseCounts> {
        self.counts.get(&offset)
    }

    pub fn count(&self, offset: usize, base: u8) -> u32 {
        self.get(offset)
            .and_then(|bases| bases.get(&base))
            .copied()
            .unwrap_or(0)
    }

    /// Offsets in ascending order
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BaseCounts)> + '_ {
        self.counts.iter().map(|(&offset, bases)| (offset, bases))
    }

    /// Number of offsets
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    ///////////////////////////////
    /// Most frequent base at an offset. On a draw, `draw_breaker` wins if it is
    /// one of the best; otherwise the smallest of the best bases
    pub fn commonest(&self, offset: usize, draw_breaker: Option<u8>) -> Option<u8> {
        let bases = self.get(offset)?;
        let max_count = *bases.values().max()?;
        let best: Vec<u8> = bases
            .iter()
            .filter(|&(_, &c)| c == max_count)
            .map(|(&b, _)| b)
            .collect();

        if best.len() > 1 {
            log::debug!(
                "Draw at location {}: {}",
                offset + 1,
                base_counts_to_str(bases)
            );
            if let Some(breaker) = draw_breaker {
                if best.contains(&breaker) {
                    return Some(breaker);
                }
            }
        }
        best.first().copied()
    }

    ///////////////////////////////
    /// One line per offset (1-based), each prefixed
    pub fn to_str(&self, prefix: &str) -> String {
        self.counts
            .iter()
            .map(|(offset, bases)| {
                format!("{}{}: {}", prefix, offset + 1, base_counts_to_str(bases))
            })
            .join("\n")
    }
}

///////////////////////////////
/// Render counts as "A:3 C:1", bases sorted
pub fn base_counts_to_str(counts: &BaseCounts) -> String {
    counts
        .iter()
        .map(|(&base, count)| format!("{}:{}", base as char, count))
        .join(" ")
}
