use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::cluster::DEFAULT_TRIM;
use crate::cluster::{base_counts_to_str, NucleotideTally};
use crate::common::{AlignedRead, SignificantRead};
use crate::fileformat::{read_aligned_fasta, read_aligned_fasta_of_length, read_offset_list_file};

#[derive(Args)]
pub struct CountBasesCMD {
    #[arg(short = 'i', value_parser)]
    /// Aligned FASTA; every sequence spans the whole alignment, gaps as '-'
    pub path_in: PathBuf,

    #[arg(long = "offsets", value_parser)]
    /// Significant locations, one 1-based location per line
    pub path_offsets: PathBuf,

    #[arg(long = "reference-alignment", value_parser)]
    /// Second aligned FASTA, e.g. reference sequences, whose counts are listed next to the reads'
    pub path_reference: Option<PathBuf>,

    #[arg(short = 'o', value_parser)]
    /// TSV to write; standard output if not given
    pub path_out: Option<PathBuf>,

    #[arg(long = "trim", value_parser, default_value_t = DEFAULT_TRIM)]
    /// Ignore this many covered bases at each end of every read
    pub trim: usize,
}

impl CountBasesCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        CountBases::run(&CountBases {
            path_in: self.path_in.clone(),
            path_offsets: self.path_offsets.clone(),
            path_reference: self.path_reference.clone(),
            path_out: self.path_out.clone(),
            trim: self.trim,
        })?;

        log::info!("Basecounts has finished successfully");
        Ok(())
    }
}

pub struct CountBases {
    pub path_in: PathBuf,
    pub path_offsets: PathBuf,
    pub path_reference: Option<PathBuf>,
    pub path_out: Option<PathBuf>,
    pub trim: usize,
}

///////////////////////////////
/// Base counts at the significant locations, for the reads and, if given,
/// the reference alignment
#[derive(Debug, Clone, Default)]
pub struct SignificantBaseCounts {
    pub reads: NucleotideTally,
    pub reference: Option<NucleotideTally>,
}

impl CountBases {
    /// Tally bases of all reads at the significant locations and write them out
    pub fn run(params: &CountBases) -> Result<SignificantBaseCounts> {
        let significant = read_offset_list_file(&params.path_offsets)?;
        let reads = read_aligned_fasta(&params.path_in, &significant, params.trim)?;
        let counts = SignificantBaseCounts {
            reads: tally_reads(&reads),
            reference: match &params.path_reference {
                Some(path) => Some(tally_reference(path, &significant, params.trim, &reads)?),
                None => None,
            },
        };

        let out: Box<dyn Write> = match &params.path_out {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
            )),
            None => Box::new(BufWriter::new(std::io::stdout().lock())),
        };
        match &counts.reference {
            Some(reference) => {
                write_base_counts_with_reference(out, &significant, reference, &counts.reads)?
            }
            None => write_base_counts(out, &significant, &counts.reads)?,
        }
        Ok(counts)
    }
}

fn tally_reads<R: SignificantRead>(reads: &[R]) -> NucleotideTally {
    let mut tally = NucleotideTally::new();
    for read in reads {
        tally.add_read(read);
    }
    tally
}

///////////////////////////////
/// Only reference sequences as long as the read alignment are counted
fn tally_reference(
    path: &Path,
    significant: &BTreeSet<usize>,
    trim: usize,
    reads: &[AlignedRead],
) -> Result<NucleotideTally> {
    let sequences = match reads.first() {
        Some(read) => read_aligned_fasta_of_length(path, significant, trim, read.len())?,
        None => read_aligned_fasta(path, significant, trim)?,
    };
    log::info!("Counting bases of {} reference sequences", sequences.len());
    Ok(tally_reads(&sequences))
}

///////////////////////////////
/// One line per significant location (1-based); locations no read covers get no counts
pub fn write_base_counts<W: Write>(
    mut out: W,
    significant: &BTreeSet<usize>,
    tally: &NucleotideTally,
) -> std::io::Result<()> {
    writeln!(out, "location\tcounts")?;
    for &offset in significant {
        let counts = tally.get(offset).map(base_counts_to_str).unwrap_or_default();
        writeln!(out, "{}\t{}", offset + 1, counts)?;
    }
    out.flush()
}

///////////////////////////////
/// Reference and read counts side by side, one line per significant location (1-based)
pub fn write_base_counts_with_reference<W: Write>(
    mut out: W,
    significant: &BTreeSet<usize>,
    reference: &NucleotideTally,
    reads: &NucleotideTally,
) -> std::io::Result<()> {
    writeln!(out, "location\tref\treads")?;
    for &offset in significant {
        let ref_counts = reference.get(offset).map(base_counts_to_str).unwrap_or_default();
        let read_counts = reads.get(offset).map(base_counts_to_str).unwrap_or_default();
        writeln!(out, "{}\t{}\t{}", offset + 1, ref_counts, read_counts)?;
    }
    out.flush()
}
