use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itertools::Itertools;

use super::{ConsistencyClusterer, ConsistentComponent, OffsetConnectedGroup};
use crate::common::SignificantRead;
use crate::fileformat::ComponentRow;

///////////////////////////////
/// Reads connected by significant offsets, regardless of bases, together with
/// their split into nucleotide-consistent components
#[derive(Debug, Clone)]
pub struct ComponentByOffsets<R> {
    reads: Vec<R>,
    offsets: BTreeSet<usize>,
    threshold: f64,
    consistent_components: Vec<ConsistentComponent<R>>,
}

impl<R: SignificantRead> ComponentByOffsets<R> {
    pub fn new(group: OffsetConnectedGroup<R>, clusterer: &ConsistencyClusterer) -> Self {
        let OffsetConnectedGroup { mut reads, offsets } = group;
        reads.sort();
        let consistent_components = clusterer.cluster(&reads);

        let component = Self {
            reads,
            offsets,
            threshold: clusterer.threshold(),
            consistent_components,
        };
        component.check();
        component
    }

    /// Consistent components must hold every read exactly once
    fn check(&self) {
        let cc_reads: usize = self.consistent_components.iter().map(|cc| cc.len()).sum();
        assert_eq!(self.reads.len(), cc_reads, "{} != {}", self.reads.len(), cc_reads);
    }

    pub fn reads(&self) -> &[R] {
        &self.reads
    }

    pub fn offsets(&self) -> &BTreeSet<usize> {
        &self.offsets
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn consistent_components(&self) -> &[ConsistentComponent<R>] {
        &self.consistent_components
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn summarize<W: Write>(&self, w: &mut W, count: usize) -> std::io::Result<()> {
        writeln!(
            w,
            "component {}: {} reads, covering {} offsets",
            count,
            self.reads.len(),
            self.offsets.len()
        )?;
        writeln!(w, "  offsets: {}", self.offsets.iter().map(|o| o + 1).join(", "))?;
        for read in &self.reads {
            writeln!(w, "   {}", read)?;
        }

        for (i, cc) in self.consistent_components.iter().enumerate() {
            cc.summarize(w, i + 1)?;
        }
        Ok(())
    }

    ///////////////////////////////
    /// Write one FASTA per consistent component into the directory.
    /// Returns the paths written
    pub fn save_fasta(&self, output_dir: &Path, count: usize) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.consistent_components.len());
        for (i, cc) in self.consistent_components.iter().enumerate() {
            let path = output_dir.join(fasta_filename(count, i + 1));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create FASTA file {:?}", path))?;
            cc.save_fasta(BufWriter::new(file))
                .with_context(|| format!("Failed to write FASTA file {:?}", path))?;
            written.push(path);
        }
        Ok(written)
    }

    /// One table row per consistent component
    pub fn table_rows(&self, count: usize, draw_breaker: Option<u8>) -> Vec<ComponentRow> {
        self.consistent_components
            .iter()
            .enumerate()
            .map(|(i, cc)| ComponentRow {
                component: count,
                cluster: i + 1,
                reads: cc.len(),
                offsets: cc.nucleotides().len(),
                consensus: cc.consensus(draw_breaker),
            })
            .collect()
    }
}

pub fn fasta_filename(count: usize, cluster: usize) -> String {
    format!("component-{}-{}.fasta", count, cluster)
}
