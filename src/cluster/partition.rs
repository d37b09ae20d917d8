use std::collections::BTreeSet;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::union_find::UnionFind;
use super::{ComponentByOffsets, ConsistencyClusterer};
use crate::common::SignificantRead;
use crate::runtime::Error;

///////////////////////////////
/// Reads connected through shared significant offsets, regardless of the
/// bases at those offsets
#[derive(Debug, Clone)]
pub struct OffsetConnectedGroup<R> {
    pub reads: Vec<R>,
    pub offsets: BTreeSet<usize>,
}

impl<R> OffsetConnectedGroup<R> {
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }
}

///////////////////////////////
/// Split reads into the connected components of the graph where two reads are
/// adjacent if their significant offsets intersect.
///
/// Groups come out in the order of their smallest read, and reads within a
/// group are sorted, so the result does not depend on input order
pub fn group_by_offsets<R: SignificantRead>(
    mut reads: Vec<R>,
) -> Result<Vec<OffsetConnectedGroup<R>>, Error> {
    if let Some(read) = reads.iter().find(|r| r.significant_offsets().is_empty()) {
        return Err(Error::no_significant_offsets(read.id()));
    }
    reads.sort();

    //Any read already seen at an offset is enough to link to
    let mut uf = UnionFind::new(reads.len());
    let mut first_read_at_offset: FxHashMap<usize, usize> = FxHashMap::default();
    for (i, read) in reads.iter().enumerate() {
        for &offset in read.significant_offsets() {
            match first_read_at_offset.get(&offset) {
                Some(&j) => {
                    uf.union(i, j);
                }
                None => {
                    first_read_at_offset.insert(offset, i);
                }
            }
        }
    }

    //Collect groups in order of first appearance of their root
    let mut group_of_root: FxHashMap<usize, usize> = FxHashMap::default();
    let mut groups: Vec<OffsetConnectedGroup<R>> = Vec::new();
    for (i, read) in reads.into_iter().enumerate() {
        let root = uf.find(i);
        let index = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(OffsetConnectedGroup {
                reads: Vec::new(),
                offsets: BTreeSet::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[index];
        group.offsets.extend(read.significant_offsets().iter().copied());
        group.reads.push(read);
    }

    log::debug!(
        "Found {} offset-connected groups over {} significant offsets",
        groups.len(),
        first_read_at_offset.len()
    );
    Ok(groups)
}

///////////////////////////////
/// Lazy sequence of reports, one per offset-connected group. Consistency
/// clustering of a group happens when it is pulled
pub struct ComponentsByOffset<R> {
    groups: std::vec::IntoIter<OffsetConnectedGroup<R>>,
    clusterer: ConsistencyClusterer,
}

impl<R: SignificantRead> ComponentsByOffset<R> {
    pub fn new(reads: Vec<R>, threshold: f64) -> Result<Self, Error> {
        let clusterer = ConsistencyClusterer::new(threshold)?;
        let groups = group_by_offsets(reads)?;
        Ok(Self {
            groups: groups.into_iter(),
            clusterer,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.clusterer.threshold()
    }
}

impl<R: SignificantRead + Send> ComponentsByOffset<R> {
    ///////////////////////////////
    /// Cluster all remaining groups on the current rayon pool. Groups are
    /// independent; output keeps the sequential order
    pub fn into_par_reports(self) -> Vec<ComponentByOffsets<R>> {
        let clusterer = self.clusterer;
        self.groups
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|group| ComponentByOffsets::new(group, &clusterer))
            .collect()
    }
}

impl<R: SignificantRead> Iterator for ComponentsByOffset<R> {
    type Item = ComponentByOffsets<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.groups
            .next()
            .map(|group| ComponentByOffsets::new(group, &self.clusterer))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

impl<R: SignificantRead> ExactSizeIterator for ComponentsByOffset<R> {}

///////////////////////////////
/// Partition reads by offset connectivity, then cluster each group by
/// nucleotide consistency
pub fn connected_components_by_offset<R: SignificantRead>(
    reads: Vec<R>,
    threshold: f64,
) -> Result<ComponentsByOffset<R>, Error> {
    ComponentsByOffset::new(reads, threshold)
}
