use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::{build_thread_pool, determine_thread_counts_1};
use crate::cluster::{ComponentByOffsets, ComponentsByOffset};
use crate::common::{AlignedRead, SignificantRead};
use crate::fileformat::{read_aligned_fasta, read_offset_list_file, ComponentTableWriter};

pub const DEFAULT_THRESHOLD: f64 = 0.9;
pub const DEFAULT_TRIM: usize = 0;
pub const SUMMARY_FILENAME: &str = "summary.txt";
pub const TABLE_FILENAME: &str = "components.tsv";

#[derive(Args)]
pub struct ClusterCMD {
    #[arg(short = 'i', value_parser)]
    /// Aligned FASTA; every sequence spans the whole alignment, gaps as '-'
    pub path_in: PathBuf,

    #[arg(long = "offsets", value_parser)]
    /// Significant locations, one 1-based location per line
    pub path_offsets: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Directory to store summary, component table and per-component FASTA in
    pub path_out: PathBuf,

    #[arg(long = "threshold", value_parser = parse_threshold, default_value_t = DEFAULT_THRESHOLD)]
    /// Fraction of shared locations a read must agree on to be salvaged into a component
    pub threshold: f64,

    #[arg(long = "trim", value_parser, default_value_t = DEFAULT_TRIM)]
    /// Ignore this many covered bases at each end of every read
    pub trim: usize,

    #[arg(long = "draw-breaker", value_parser = parse_base)]
    /// Base reported in the consensus when it ties for most common
    pub draw_breaker: Option<u8>,

    #[arg(long = "no-fasta")]
    /// Do not write one FASTA per consistent component
    pub no_fasta: bool,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    num_threads_total: Option<usize>,
}

impl ClusterCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        let num_threads = determine_thread_counts_1(self.num_threads_total)?;
        log::info!("Using threads {}", num_threads);

        let stats = Cluster::run(&Cluster {
            path_in: self.path_in.clone(),
            path_offsets: self.path_offsets.clone(),
            path_out: self.path_out.clone(),
            threshold: self.threshold,
            trim: self.trim,
            draw_breaker: self.draw_breaker,
            write_fasta: !self.no_fasta,
            num_threads,
        })?;

        log::info!(
            "Cluster has finished successfully: {} components, {} consistent components",
            stats.num_components,
            stats.num_consistent_components
        );
        Ok(())
    }
}

pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(format!("threshold must be within [0, 1], got {}", s));
    }
    Ok(threshold)
}

pub fn parse_base(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii_alphabetic() => Ok(b.to_ascii_uppercase()),
        _ => Err(format!("'{}' is not a single base", s)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterStats {
    pub num_reads: usize,
    pub num_reads_without_offsets: usize,
    pub num_components: usize,
    pub num_consistent_components: usize,
}

pub struct Cluster {
    pub path_in: PathBuf,
    pub path_offsets: PathBuf,
    pub path_out: PathBuf,
    pub threshold: f64,
    pub trim: usize,
    pub draw_breaker: Option<u8>,
    pub write_fasta: bool,
    pub num_threads: usize,
}

impl Cluster {
    /// Run the algorithm
    pub fn run(params: &Cluster) -> Result<ClusterStats> {
        let significant = read_offset_list_file(&params.path_offsets)?;
        log::info!("Read {} significant locations", significant.len());

        let reads = read_aligned_fasta(&params.path_in, &significant, params.trim)?;
        let num_reads = reads.len();

        //Only reads covering a significant location can be connected
        let reads: Vec<AlignedRead> = reads
            .into_iter()
            .filter(|r| !r.significant_offsets().is_empty())
            .collect();
        let num_reads_without_offsets = num_reads - reads.len();
        log::info!(
            "{} reads cover at least one significant location, {} cover none and are left out",
            reads.len(),
            num_reads_without_offsets
        );

        std::fs::create_dir_all(&params.path_out)
            .with_context(|| format!("Failed to create output directory {:?}", params.path_out))?;

        let components = ComponentsByOffset::new(reads, params.threshold)?;
        let mut outputs = ClusterOutputs::create(params)?;

        if params.num_threads > 1 {
            let pool = build_thread_pool(params.num_threads)?;
            let reports = pool.install(|| components.into_par_reports());
            for report in &reports {
                outputs.write(report)?;
            }
        } else {
            for report in components {
                outputs.write(&report)?;
            }
        }

        let mut stats = outputs.finish()?;
        stats.num_reads = num_reads;
        stats.num_reads_without_offsets = num_reads_without_offsets;
        Ok(stats)
    }
}

///////////////////////////////
/// Files written by the cluster command, filled one report at a time
struct ClusterOutputs<'a> {
    params: &'a Cluster,
    summary: BufWriter<File>,
    table: ComponentTableWriter<BufWriter<File>>,
    stats: ClusterStats,
}

impl<'a> ClusterOutputs<'a> {
    fn create(params: &'a Cluster) -> Result<Self> {
        Ok(Self {
            params,
            summary: BufWriter::new(create_file(&params.path_out.join(SUMMARY_FILENAME))?),
            table: ComponentTableWriter::new(BufWriter::new(create_file(
                &params.path_out.join(TABLE_FILENAME),
            )?)),
            stats: ClusterStats::default(),
        })
    }

    fn write(&mut self, report: &ComponentByOffsets<AlignedRead>) -> Result<()> {
        self.stats.num_components += 1;
        self.stats.num_consistent_components += report.consistent_components().len();
        let count = self.stats.num_components;

        log::debug!(
            "Component {}: {} reads over {} offsets, {} consistent components",
            count,
            report.len(),
            report.offsets().len(),
            report.consistent_components().len()
        );

        report.summarize(&mut self.summary, count)?;
        self.table
            .write_rows(&report.table_rows(count, self.params.draw_breaker))?;
        if self.params.write_fasta {
            report.save_fasta(&self.params.path_out, count)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<ClusterStats> {
        self.summary.flush()?;
        self.table.finish()?;
        Ok(self.stats)
    }
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create {:?}", path))
}
