//! Access log analysis across one or more files.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use strider_track::TrackingRecord;
use tracing::{debug, info_span};

use crate::Result;
use crate::session::Session;

/// Options for [`analyze_files`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Worker threads (0 = auto).
    pub jobs: usize,
}

impl AnalyzeOptions {
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Resolved worker count.
    #[must_use]
    pub fn job_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().saturating_sub(2).max(1)
        } else {
            self.jobs
        }
    }
}

/// Finished records from one access log.
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub records: Vec<TrackingRecord>,
}

/// Replay a single access log.
///
/// # Errors
///
/// Returns an error if the log cannot be read or contains invalid directives.
pub fn analyze_file(path: &Path) -> Result<FileAnalysis> {
    let _span = info_span!("analyze", path = %path.display()).entered();

    let records = Session::from_path(path)?;
    for record in &records {
        crate::metrics::record_variable(record);
    }
    debug!(variables = records.len(), "log replayed");

    Ok(FileAnalysis {
        path: path.to_path_buf(),
        records,
    })
}

/// Replay several access logs in parallel.
///
/// Each log gets its own session; results are returned in input order.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be built. Per-file
/// failures are reported in the returned vector.
pub fn analyze_files(
    paths: &[PathBuf],
    options: &AnalyzeOptions,
) -> Result<Vec<Result<FileAnalysis>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.job_count())
        .build()?;

    Ok(pool.install(|| paths.par_iter().map(|path| analyze_file(path)).collect()))
}
