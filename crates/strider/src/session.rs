//! Replays an access log into one tracking record per variable.

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashMap;
use strider_track::{Label, TrackingRecord};
use tracing::{debug, warn};

use crate::trace::{self, Directive, TraceError};

/// Tracking records built from a single access log.
///
/// Records keep the order their `begin` directives appeared in. A `begin`
/// for a label that is still active finishes the old record and starts a new
/// lifetime. Labels are matched after truncation to the record label bound,
/// so two log labels sharing their first 63 bytes name the same variable.
#[derive(Debug, Default)]
pub struct Session {
    records: Vec<TrackingRecord>,
    active: FxHashMap<String, usize>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay every directive in `reader`, one line at a time.
    ///
    /// # Errors
    ///
    /// Returns the first IO, parse or unknown-variable error.
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<(), TraceError> {
        for entry in trace::parse_directives(reader) {
            let (line, directive) = entry?;
            self.apply(line, directive)?;
        }
        Ok(())
    }

    /// Build a session from a log file and finish every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or replayed.
    pub fn from_path(path: &Path) -> Result<Vec<TrackingRecord>, TraceError> {
        let mut session = Self::new();
        session.ingest(trace::open_log(path)?)?;
        Ok(session.close())
    }

    /// Apply one directive found on `line`.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::UnknownVariable`] for an access or finish of a
    /// label that is not active.
    pub fn apply(&mut self, line: usize, directive: Directive) -> Result<(), TraceError> {
        match directive {
            Directive::Begin {
                label,
                address,
                owner,
            } => {
                let mut record = TrackingRecord::begin(&label, address);
                if let Some(owner) = owner {
                    record.set_owner(&owner);
                }
                let key = record.label().as_str().to_owned();
                let idx = self.records.len();
                self.records.push(record);
                if let Some(previous) = self.active.insert(key, idx) {
                    warn!(line, variable = %label, "variable restarted before finish");
                    self.records[previous].finish();
                }
                debug!(line, variable = %label, address, "begin tracking");
            }
            Directive::Access { label, address } => {
                let idx = self.lookup(line, &label)?;
                self.records[idx].record_access(address);
            }
            Directive::Finish { label } => {
                let idx = self.lookup(line, &label)?;
                self.active.remove(Label::new(&label).as_str());
                let summary = self.records[idx].finish();
                debug!(
                    line,
                    variable = %label,
                    accessed = summary.accessed,
                    "finish tracking"
                );
            }
        }
        Ok(())
    }

    fn lookup(&self, line: usize, label: &str) -> Result<usize, TraceError> {
        self.active
            .get(Label::new(label).as_str())
            .copied()
            .ok_or_else(|| TraceError::UnknownVariable {
                line,
                label: label.to_string(),
            })
    }

    /// Number of variables still being tracked.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.len()
    }

    /// Finish any still-active records and return all of them.
    #[must_use]
    pub fn close(mut self) -> Vec<TrackingRecord> {
        for (label, idx) in self.active.drain() {
            debug!(variable = %label, "finishing at end of log");
            self.records[idx].finish();
        }
        self.records
    }
}
