//! Strider - memory access stride tracker
//!
//! Replays access logs through per-variable stride trackers and reports the
//! dominant stride of each tracked variable.
//!
//! # Example
//!
//! ```ignore
//! use strider::{AnalyzeOptions, ReportConfig, analyze_files, write_reports};
//!
//! let results = analyze_files(&paths, &AnalyzeOptions::default())?;
//! for analysis in results {
//!     write_reports(&mut std::io::stdout(), &analysis?.records, &ReportConfig::default())?;
//! }
//! ```

// Re-export from sub-crates
pub use strider_report::{
    ReportConfig, ReportError, ReportFormat, StrideDisplay, render_to_string, write_report,
    write_reports,
};
pub use strider_track::{
    AccessFilter, CountingTracer, LABEL_CAPACITY, Label, STRIDE_TABLE_CAPACITY, SlotOutcome,
    Stride, StrideSlot, StrideSummary, StrideTable, StrideTracker, Tracer, TrackingRecord,
    WatchTracer,
};

mod analyze;
pub mod metrics;
mod session;
pub mod trace;

pub use analyze::{AnalyzeOptions, FileAnalysis, analyze_file, analyze_files};
pub use session::Session;
pub use trace::{Directive, TraceError};

use thiserror::Error;

/// Strider errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
