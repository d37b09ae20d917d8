use std::process::ExitCode;

use clap::Parser;
use varcomp::command::Commands;
use varcomp::runtime::{setup_global_logger, LogLevel};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// trace, debug, info, warn, error or off. RUST_LOG takes precedence
    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    setup_global_logger(cli.log_level);
    log::debug!("Running {:?}", cli.command);

    if let Err(e) = cli.command.try_execute() {
        log::error!("{:?} failed", cli.command);
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
