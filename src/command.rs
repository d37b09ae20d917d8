use std::fmt;

use clap::Subcommand;

// Module declarations (alphabetical)
pub mod basecounts;
pub mod cluster;
pub mod threadcount;

pub use basecounts::{CountBases, CountBasesCMD, SignificantBaseCounts};
pub use cluster::{Cluster, ClusterCMD, ClusterStats};
pub use threadcount::{build_thread_pool, determine_thread_counts_1};

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// Group reads by shared significant locations, then split each group into nucleotide-consistent components
    Cluster(ClusterCMD),
    /// Count the bases all reads carry at each significant location
    Basecounts(CountBasesCMD),
}

impl Commands {
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        match self {
            Commands::Cluster(cmd) => cmd.try_execute(),
            Commands::Basecounts(cmd) => cmd.try_execute(),
        }
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::Cluster(_) => "Cluster",
            Commands::Basecounts(_) => "Basecounts",
        };
        write!(f, "{}", cmd)
    }
}
