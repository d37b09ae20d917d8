mod consistent;
mod partition;
mod report;
mod tally;
mod union_find;

pub use consistent::{Agreement, ConsistencyClusterer, ConsistentComponent};
pub use partition::{
    connected_components_by_offset, group_by_offsets, ComponentsByOffset, OffsetConnectedGroup,
};
pub use report::{fasta_filename, ComponentByOffsets};
pub use tally::{base_counts_to_str, BaseCounts, NucleotideTally};

#[cfg(test)]
pub(crate) mod test_reads {
    use std::collections::BTreeSet;

    use crate::common::AlignedRead;

    /// Read over a 20bp alignment carrying the given bases, all of them significant
    pub fn read(id: &str, sites: &[(usize, u8)]) -> AlignedRead {
        let mut sequence = vec![b'-'; 20];
        for &(offset, base) in sites {
            sequence[offset] = base;
        }
        let significant: BTreeSet<usize> = sites.iter().map(|&(offset, _)| offset).collect();
        AlignedRead::new(id, &sequence).with_significant_offsets(&significant, 0)
    }
}
