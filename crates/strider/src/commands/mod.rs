//! Command implementations.
//!
//! Each submodule handles a specific CLI command.

mod analyze;
mod demo;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Analyze { logs, jobs, report } => {
            analyze::cmd_analyze(logs, *jobs, &report.config(), cli.silent)
        }
        Commands::Demo {
            base,
            stride,
            count,
            filter,
            report,
        } => demo::cmd_demo(*base, *stride, *count, (*filter).into(), &report.config()),
    }
}
