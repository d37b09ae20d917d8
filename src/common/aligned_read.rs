use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use super::{is_nucleotide, U8_CHAR_GAP};

///////////////////////////////
/// What the clustering needs to know about a read.
///
/// `base` must be defined for every offset returned by `significant_offsets`,
/// which are sorted and unique. The `Ord` implementation is the total order
/// used for all deterministic output.
pub trait SignificantRead: Clone + Ord + fmt::Display {
    fn id(&self) -> &str;

    /// Start of the read in genome coordinates (0-based)
    fn offset(&self) -> usize;

    fn significant_offsets(&self) -> &[usize];

    fn base(&self, offset: usize) -> u8;

    /// Sequence as it is written to FASTA
    fn sequence(&self) -> &[u8];
}

///////////////////////////////
/// A read taken from an alignment, where every sequence has the genome's length
/// and uncovered positions are gaps.
///
/// Field order matters: the derived ordering is start offset, then id, then sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlignedRead {
    offset: usize,
    id: String,
    sequence: Vec<u8>,
    significant_offsets: Vec<usize>,
}

impl AlignedRead {
    pub fn new<I: Into<String>>(id: I, sequence: &[u8]) -> Self {
        let sequence = sequence.to_ascii_uppercase();
        let offset = sequence
            .iter()
            .position(|&b| b != U8_CHAR_GAP)
            .unwrap_or(sequence.len());

        AlignedRead {
            offset,
            id: id.into(),
            sequence,
            significant_offsets: Vec::new(),
        }
    }

    ///////////////////////////////
    /// Keep the significant offsets this read actually carries a nucleotide at.
    /// `trim` covered positions are ignored at each end of the read
    pub fn with_significant_offsets(mut self, significant: &BTreeSet<usize>, trim: usize) -> Self {
        let (start, end) = self.covered_range();
        let start = start.saturating_add(trim);
        let end = end.saturating_sub(trim);

        self.significant_offsets = if start < end {
            significant
                .range(start..end)
                .copied()
                .filter(|&o| is_nucleotide(self.sequence[o]))
                .collect()
        } else {
            Vec::new()
        };
        self
    }

    /// Half-open range from the first to the last non-gap position
    pub fn covered_range(&self) -> (usize, usize) {
        let end = self
            .sequence
            .iter()
            .rposition(|&b| b != U8_CHAR_GAP)
            .map_or(self.offset, |p| p + 1);
        (self.offset, end)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl SignificantRead for AlignedRead {
    fn id(&self) -> &str {
        &self.id
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn significant_offsets(&self) -> &[usize] {
        &self.significant_offsets
    }

    #[inline(always)]
    fn base(&self, offset: usize) -> u8 {
        self.sequence[offset]
    }

    fn sequence(&self) -> &[u8] {
        &self.sequence
    }
}

// Locations are shown 1-based
impl fmt::Display for AlignedRead {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} start={} sites={}",
            self.id,
            self.offset + 1,
            self.significant_offsets
                .iter()
                .map(|&o| format!("{}:{}", o + 1, self.sequence[o] as char))
                .join(" ")
        )
    }
}
