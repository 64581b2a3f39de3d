//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use strider::{AccessFilter, ReportConfig, ReportFormat, StrideDisplay};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "strider")]
#[command(about = "Memory access stride tracker - reports dominant strides per variable")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (adds a strider=debug log filter directive)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter directive added on top of `RUST_LOG`.
    #[must_use]
    pub const fn log_directive(&self) -> &'static str {
        if self.verbose {
            "strider=debug"
        } else if self.silent {
            "strider=error"
        } else {
            "strider=info"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay access logs and report each tracked variable
    Analyze {
        /// Access log files (plain text or zstd-compressed)
        #[arg(value_name = "LOG", required = true)]
        logs: Vec<PathBuf>,

        /// Number of parallel jobs (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        #[command(flatten)]
        report: ReportArgs,
    },
    /// Track a synthetic strided walk and report it
    Demo {
        /// Base address of the synthetic variable (hex or decimal)
        #[arg(long, default_value = "0x1000", value_parser = parse_address_arg)]
        base: u64,

        /// Distance between consecutive accesses (negative walks backwards)
        #[arg(long, default_value = "8", allow_hyphen_values = true)]
        stride: i64,

        /// Number of accesses
        #[arg(long, default_value = "64")]
        count: u64,

        /// Which accesses to record
        #[arg(long, value_enum, default_value = "both")]
        filter: FilterArg,

        #[command(flatten)]
        report: ReportArgs,
    },
}

/// Report rendering arguments shared by commands.
#[derive(clap::Args, Clone, Debug)]
pub struct ReportArgs {
    /// Report layout
    #[arg(long, value_enum, default_value = "plain")]
    pub format: FormatArg,

    /// Print strides as signed values (backward walks show as negative)
    #[arg(long)]
    pub signed: bool,

    /// Also dump the stride table
    #[arg(long)]
    pub table: bool,

    /// Decimals for the dominant stride proportion
    #[arg(long, default_value = "8")]
    pub precision: usize,
}

impl ReportArgs {
    pub fn config(&self) -> ReportConfig {
        let display = if self.signed {
            StrideDisplay::Signed
        } else {
            StrideDisplay::Unsigned
        };
        ReportConfig::default()
            .with_format(self.format.into())
            .with_stride_display(display)
            .with_table(self.table)
            .with_precision(self.precision)
    }
}

/// Report layout argument.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum FormatArg {
    /// Variable fields only
    #[default]
    Plain,
    /// Prefixed with the owning function name
    Device,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Plain => Self::Plain,
            FormatArg::Device => Self::Device,
        }
    }
}

/// Access filter argument.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum FilterArg {
    Reads,
    Writes,
    #[default]
    Both,
}

impl From<FilterArg> for AccessFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Reads => Self::Reads,
            FilterArg::Writes => Self::Writes,
            FilterArg::Both => Self::Both,
        }
    }
}

fn parse_address_arg(text: &str) -> Result<u64, String> {
    strider::trace::parse_address(text)
}
