use std::cmp::Ordering;
use std::io::Write;

use bio::io::fasta;
use itertools::Itertools;

use super::NucleotideTally;
use crate::common::SignificantRead;
use crate::runtime::Error;

///////////////////////////////
/// Reads that share significant offsets and (largely) agree on the bases at
/// them, together with the tally built from exactly those reads
#[derive(Debug, Clone)]
pub struct ConsistentComponent<R> {
    reads: Vec<R>,
    nucleotides: NucleotideTally,
}

impl<R: SignificantRead> ConsistentComponent<R> {
    pub fn new(mut reads: Vec<R>, nucleotides: NucleotideTally) -> Self {
        reads.sort();
        Self { reads, nucleotides }
    }

    /// Member reads, sorted
    pub fn reads(&self) -> &[R] {
        &self.reads
    }

    pub fn nucleotides(&self) -> &NucleotideTally {
        &self.nucleotides
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    ///////////////////////////////
    /// Commonest base per offset, as "location:base" with 1-based locations
    pub fn consensus(&self, draw_breaker: Option<u8>) -> String {
        self.nucleotides
            .offsets()
            .filter_map(|offset| {
                self.nucleotides
                    .commonest(offset, draw_breaker)
                    .map(|base| format!("{}:{}", offset + 1, base as char))
            })
            .join(" ")
    }

    ///////////////////////////////
    /// Write member reads as FASTA, in read order
    pub fn save_fasta<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut writer = fasta::Writer::new(writer);
        for read in &self.reads {
            writer.write(read.id(), None, read.sequence())?;
        }
        writer.flush()
    }

    pub fn summarize<W: Write>(&self, w: &mut W, count: usize) -> std::io::Result<()> {
        let plural = if self.reads.len() == 1 { "" } else { "s" };
        writeln!(
            w,
            "    Consistent component {}, {} read{}, covering {} offset{}",
            count,
            self.reads.len(),
            plural,
            self.nucleotides.len(),
            if self.nucleotides.len() == 1 { "" } else { "s" }
        )?;
        writeln!(w, "    Nucleotides for each offset:")?;
        writeln!(w, "{}", self.nucleotides.to_str("      "))?;
        writeln!(w, "    Read{}:", plural)?;
        for read in &self.reads {
            writeln!(w, "{}", read)?;
        }
        Ok(())
    }
}

///////////////////////////////
/// How well a read agrees with a tally at the offsets they share
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Agreement {
    /// Shared offsets where the read's base has been seen
    pub matching: usize,
    /// Offsets of the read present in the tally
    pub total: usize,
}

impl Agreement {
    pub fn score<R: SignificantRead>(read: &R, tally: &NucleotideTally) -> Self {
        let mut agreement = Agreement::default();
        for &offset in read.significant_offsets() {
            if tally.contains_offset(offset) {
                agreement.total += 1;
                if tally.contains(offset, read.base(offset)) {
                    agreement.matching += 1;
                }
            }
        }
        agreement
    }

    /// None if nothing is shared
    pub fn fraction(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.matching as f64 / self.total as f64)
        }
    }

    /// A read sharing nothing with the tally can never pass
    pub fn passes(&self, threshold: f64) -> bool {
        self.fraction().map_or(false, |f| f >= threshold)
    }
}

///////////////////////////////
/// No shared offset carries a base the tally has not seen
fn agrees_exactly<R: SignificantRead>(read: &R, tally: &NucleotideTally) -> bool {
    read.significant_offsets()
        .iter()
        .all(|&offset| !tally.contains_offset(offset) || tally.contains(offset, read.base(offset)))
}

///////////////////////////////
/// Seed preference: most significant offsets, then latest start, then read order
fn seed_order<R: SignificantRead>(a: &R, b: &R) -> Ordering {
    b.significant_offsets()
        .len()
        .cmp(&a.significant_offsets().len())
        .then_with(|| b.offset().cmp(&a.offset()))
        .then_with(|| a.cmp(b))
}

///////////////////////////////
/// Greedy consensus clustering of one offset-connected group.
///
/// Each round seeds a tally with the preferred remaining read. Phase 1 takes
/// every read that agrees exactly with the growing tally. Phase 2 scores each
/// phase-1 reject against the tally as it stood after phase 1 and takes those
/// whose agreement reaches the threshold; their bases are added only once all
/// of them have been scored. Every round removes at least its seed
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyClusterer {
    threshold: f64,
}

impl ConsistencyClusterer {
    pub fn new(threshold: f64) -> Result<Self, Error> {
        // NaN fails the range check too
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::invalid_threshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cluster<R: SignificantRead>(&self, reads: &[R]) -> Vec<ConsistentComponent<R>> {
        let mut remaining: Vec<usize> = (0..reads.len()).collect();
        let mut components = Vec::new();

        while !remaining.is_empty() {
            let before = remaining.len();
            components.push(self.next_component(reads, &mut remaining));
            debug_assert!(remaining.len() < before);
        }
        components
    }

    fn next_component<R: SignificantRead>(
        &self,
        reads: &[R],
        remaining: &mut Vec<usize>,
    ) -> ConsistentComponent<R> {
        remaining.sort_by(|&a, &b| seed_order(&reads[a], &reads[b]));

        let seed = remaining[0];
        let mut tally = NucleotideTally::from_read(&reads[seed]);
        let mut accepted = vec![seed];
        let mut rejected = Vec::new();

        //Phase 1: exact agreement with the live tally
        for &i in &remaining[1..] {
            let read = &reads[i];
            if agrees_exactly(read, &tally) {
                tally.add_read(read);
                accepted.push(i);
            } else {
                rejected.push(i);
            }
        }
        let exact = accepted.len();

        //Phase 2: score all rejects against the frozen tally, then commit
        let (salvaged, left): (Vec<usize>, Vec<usize>) = rejected
            .into_iter()
            .partition(|&i| Agreement::score(&reads[i], &tally).passes(self.threshold));
        for &i in &salvaged {
            tally.add_read(&reads[i]);
        }
        accepted.extend_from_slice(&salvaged);

        log::trace!(
            "Consistent component seeded by {}: {} exact, {} salvaged, {} left",
            reads[seed].id(),
            exact,
            salvaged.len(),
            left.len()
        );

        *remaining = left;
        ConsistentComponent::new(
            accepted.into_iter().map(|i| reads[i].clone()).collect(),
            tally,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::test_reads::read;
    use crate::common::AlignedRead;

    fn ids(component: &ConsistentComponent<AlignedRead>) -> Vec<&str> {
        component.reads().iter().map(|r| r.id()).collect()
    }

    fn cluster(reads: &[AlignedRead], threshold: f64) -> Vec<ConsistentComponent<AlignedRead>> {
        ConsistencyClusterer::new(threshold).unwrap().cluster(reads)
    }

    #[test]
    fn threshold_range() {
        assert!(ConsistencyClusterer::new(0.0).is_ok());
        assert!(ConsistencyClusterer::new(1.0).is_ok());
        assert!(ConsistencyClusterer::new(-0.1).is_err());
        assert!(ConsistencyClusterer::new(1.01).is_err());
        assert!(ConsistencyClusterer::new(f64::NAN).is_err());
    }

    #[test]
    fn exact_agreement_joins() {
        let a = read("A", &[(1, b'G'), (2, b'C')]);
        let b = read("B", &[(2, b'C'), (3, b'T')]);
        let components = cluster(&[a, b], 1.0);

        assert_eq!(components.len(), 1);
        assert_eq!(ids(&components[0]), vec!["A", "B"]);
        assert_eq!(components[0].nucleotides().count(2, b'C'), 2);
        assert_eq!(components[0].nucleotides().len(), 3);
    }

    #[test]
    fn conflict_splits() {
        let a = read("A", &[(1, b'G'), (2, b'C')]);
        let b = read("B", &[(2, b'T'), (3, b'T')]);
        let components = cluster(&[a.clone(), b.clone()], 0.5);

        // Same size, B starts later so it seeds first
        assert_eq!(components.len(), 2);
        assert_eq!(ids(&components[0]), vec!["B"]);
        assert_eq!(ids(&components[1]), vec!["A"]);

        // Ratio 0/1 passes only a zero threshold
        let components = cluster(&[a, b], 0.0);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].nucleotides().count(2, b'C'), 1);
        assert_eq!(components[0].nucleotides().count(2, b'T'), 1);
    }

    #[test]
    fn identical_bases_single_component() {
        let reads: Vec<AlignedRead> = (0..5)
            .map(|i| read(&format!("r{}", i), &[(4, b'A')]))
            .collect();
        let components = cluster(&reads, 1.0);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 5);
        assert_eq!(components[0].nucleotides().count(4, b'A'), 5);
        assert_eq!(components[0].nucleotides().len(), 1);
    }

    #[test]
    fn seed_is_longest_then_latest() {
        let short = read("short", &[(9, b'A')]);
        let early = read("early", &[(1, b'A'), (2, b'A'), (3, b'A')]);
        let late = read("late", &[(5, b'A'), (6, b'A'), (9, b'C')]);

        let mut order = vec![short.clone(), early.clone(), late.clone()];
        order.sort_by(seed_order);
        assert_eq!(order, vec![late, early, short]);
    }

    #[test]
    fn disjoint_read_vacuously_accepted() {
        let a = read("A", &[(1, b'A'), (2, b'A')]);
        let far = read("far", &[(8, b'T')]);
        for threshold in [0.0, 0.5, 1.0] {
            let components = cluster(&[a.clone(), far.clone()], threshold);
            assert_eq!(components.len(), 1);
            assert_eq!(ids(&components[0]), vec!["A", "far"]);
        }
    }

    #[test]
    fn partial_agreement_salvaged_by_threshold() {
        let seed = read("S", &[(1, b'A'), (2, b'A'), (3, b'A'), (4, b'A')]);
        // 2 of 3 shared offsets agree
        let x = read("X", &[(1, b'C'), (2, b'A'), (3, b'A')]);

        let components = cluster(&[seed.clone(), x.clone()], 0.6);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].nucleotides().count(1, b'C'), 1);

        let components = cluster(&[seed, x], 0.7);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn salvaged_reads_do_not_vote_for_each_other() {
        let seed = read("S", &[(1, b'A'), (2, b'A'), (3, b'A'), (4, b'A')]);
        let x = read("X", &[(1, b'C'), (2, b'A'), (3, b'A')]);
        // Only 1 of 3 against the frozen tally; 2 of 3 had X's C counted
        let y = read("Y", &[(1, b'C'), (2, b'A'), (3, b'G')]);

        let components = cluster(&[seed, x, y], 0.6);
        assert_eq!(components.len(), 2);
        assert_eq!(ids(&components[0]), vec!["S", "X"]);
        assert_eq!(ids(&components[1]), vec!["Y"]);
    }

    #[test]
    fn phase_one_judges_against_accepted_reads() {
        // X is accepted first and brings G at 7, which Y then contradicts
        let seed = read("S", &[(1, b'A'), (2, b'A'), (3, b'A')]);
        let x = read("X", &[(1, b'A'), (7, b'G')]);
        let y = read("Y", &[(1, b'A'), (7, b'T')]);

        let components = cluster(&[y, x, seed], 0.6);
        assert_eq!(components.len(), 2);
        assert_eq!(ids(&components[0]), vec!["S", "X"]);
        assert_eq!(components[0].nucleotides().count(7, b'G'), 1);
        assert!(!components[0].nucleotides().contains(7, b'T'));
        assert_eq!(ids(&components[1]), vec!["Y"]);
    }

    #[test]
    fn round_leaves_only_unaccepted_reads() {
        let reads = vec![
            read("S", &[(1, b'A'), (2, b'A'), (3, b'A')]),
            read("X", &[(1, b'C'), (2, b'A')]),
            read("Y", &[(2, b'A')]),
            read("Z", &[(3, b'G')]),
        ];
        let clusterer = ConsistencyClusterer::new(1.0).unwrap();
        let mut remaining: Vec<usize> = (0..reads.len()).collect();

        let component = clusterer.next_component(&reads, &mut remaining);
        assert_eq!(ids(&component), vec!["S", "Y"]);
        remaining.sort();
        assert_eq!(remaining, vec![1, 3]);
    }

    #[test]
    fn phase_one_conflict_discards_all_bases() {
        // R shares 2 with S (conflict) and carries a new offset 7
        let seed = read("S", &[(1, b'A'), (2, b'A'), (3, b'A')]);
        let r = read("R", &[(2, b'G'), (7, b'T')]);
        let components = cluster(&[seed, r], 1.0);
        assert_eq!(components.len(), 2);
        assert!(!components[0].nucleotides().contains_offset(7));
    }

    #[test]
    fn threshold_monotonicity() {
        let mut tally = NucleotideTally::new();
        for (offset, base) in [(1, b'A'), (2, b'A'), (3, b'C'), (4, b'G'), (5, b'T')] {
            tally.add(offset, base);
        }
        let candidates = vec![
            read("a", &[(1, b'A'), (2, b'T'), (3, b'C')]),
            read("b", &[(1, b'T'), (2, b'T'), (3, b'C'), (9, b'A')]),
            read("c", &[(4, b'G'), (5, b'T')]),
            read("d", &[(4, b'A')]),
            read("e", &[(11, b'A')]),
        ];
        let thresholds = [0.0, 0.2, 0.34, 0.5, 0.67, 0.9, 1.0];
        for pair in thresholds.windows(2) {
            for c in &candidates {
                let agreement = Agreement::score(c, &tally);
                if agreement.passes(pair[1]) {
                    assert!(agreement.passes(pair[0]));
                }
            }
        }
        // No shared offset never passes
        assert!(!Agreement::score(&candidates[4], &tally).passes(0.0));
        assert_eq!(
            Agreement::score(&candidates[1], &tally),
            Agreement { matching: 1, total: 3 }
        );
    }

    #[test]
    fn partition_is_complete_and_terminates() {
        let reads: Vec<AlignedRead> = (0..25)
            .map(|i| {
                let b1 = [b'A', b'C', b'G'][i % 3];
                let b2 = [b'A', b'T'][i % 2];
                read(&format!("r{:02}", i), &[(i % 4, b1), (4 + i % 3, b2), (7 + i % 5, b'C')])
            })
            .collect();

        for threshold in [0.0, 0.5, 1.0] {
            let components = cluster(&reads, threshold);
            assert!(components.len() <= reads.len());
            assert!(components.iter().all(|c| !c.is_empty()));

            let mut seen: Vec<AlignedRead> =
                components.iter().flat_map(|c| c.reads().iter().cloned()).collect();
            seen.sort();
            let mut expected = reads.clone();
            expected.sort();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn consensus_and_fasta() {
        let a = read("A", &[(1, b'G'), (2, b'C')]);
        let b = read("B", &[(2, b'C'), (3, b'T')]);
        let components = cluster(&[a, b], 1.0);
        assert_eq!(components[0].consensus(None), "2:G 3:C 4:T");

        let mut out = Vec::new();
        components[0].save_fasta(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let headers: Vec<&str> = text.lines().filter(|l| l.starts_with('>')).collect();
        assert_eq!(headers, vec![">A", ">B"]);
    }

    #[test]
    fn summary_text() {
        let a = read("A", &[(1, b'G')]);
        let component = &cluster(&[a], 1.0)[0];
        let mut out = Vec::new();
        component.summarize(&mut out, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "    Consistent component 3, 1 read, covering 1 offset\n\
             \x20   Nucleotides for each offset:\n\
             \x20     2: G:1\n\
             \x20   Read:\n\
             A start=2 sites=2:G\n"
        );
    }
}
