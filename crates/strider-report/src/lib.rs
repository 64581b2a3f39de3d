//! Text reports for finalized stride tracking records.
//!
//! Two layouts are provided: [`ReportFormat::Plain`] for host consoles and
//! [`ReportFormat::Device`], which also names the owning function. Both
//! surface every summary field of a [`TrackingRecord`].
//!
//! ```
//! use strider_report::{ReportConfig, render_to_string};
//! use strider_track::TrackingRecord;
//!
//! let mut record = TrackingRecord::begin("x", 1000);
//! record.record_access(1004);
//! record.finish();
//!
//! let text = render_to_string(&record, &ReportConfig::default()).unwrap();
//! assert!(text.contains("Max Memory Step: 4"));
//! ```

use std::io::{self, Write};

use strider_track::{Stride, TrackingRecord};
use thiserror::Error;

/// Default number of decimals for the dominant stride proportion.
pub const DEFAULT_PRECISION: usize = 8;

/// Report rendering error.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("record for `{label}` has not been finished")]
    Unfinished { label: String },
}

/// Report layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Variable fields, with a `Function Name:` line when the owner is set.
    #[default]
    Plain,
    /// Prefixed with the owning function name.
    Device,
}

/// How stride values are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrideDisplay {
    /// Raw 64-bit wrapping difference.
    #[default]
    Unsigned,
    /// Two's-complement view, so backward strides print negative.
    Signed,
}

impl StrideDisplay {
    fn format(self, stride: Stride) -> String {
        match self {
            Self::Unsigned => stride.as_unsigned().to_string(),
            Self::Signed => stride.as_signed().to_string(),
        }
    }
}

/// Controls report rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    pub format: ReportFormat,
    pub stride_display: StrideDisplay,
    /// Also list the occupied stride table slots.
    pub show_table: bool,
    /// Decimals for the dominant stride proportion.
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Plain,
            stride_display: StrideDisplay::Unsigned,
            show_table: false,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub const fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub const fn with_stride_display(mut self, display: StrideDisplay) -> Self {
        self.stride_display = display;
        self
    }

    #[must_use]
    pub const fn with_table(mut self, show_table: bool) -> Self {
        self.show_table = show_table;
        self
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

/// Write the report for one finished record.
///
/// # Errors
///
/// Returns an error if the record was not finished or the writer fails.
pub fn write_report<W: Write>(
    out: &mut W,
    record: &TrackingRecord,
    config: &ReportConfig,
) -> Result<(), ReportError> {
    let summary = record.summary().ok_or_else(|| ReportError::Unfinished {
        label: record.label().to_string(),
    })?;

    writeln!(out)?;
    if config.format == ReportFormat::Device {
        writeln!(out, "function_name: {}", record.owner())?;
        writeln!(out)?;
    }
    writeln!(out, "Variable Name: {}", record.label())?;
    if config.format == ReportFormat::Plain && !record.owner().is_empty() {
        writeln!(out, "Function Name: {}", record.owner())?;
    }
    writeln!(out, "Address Begin: 0x{:x}", record.address_begin())?;
    writeln!(out, "Address End: 0x{:x}", record.address_end().unwrap_or(0))?;
    writeln!(out, "Variable Size: {} bytes", summary.variable_size)?;
    writeln!(out, "Accessed: {} times", summary.accessed)?;
    writeln!(
        out,
        "Max Memory Step: {}",
        config.stride_display.format(summary.dominant_stride)
    )?;
    writeln!(
        out,
        "Max Memory Step Proportion: {:.*}",
        config.precision, summary.dominant_stride_fraction
    )?;

    if config.show_table {
        write_table(out, record, config.stride_display)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_table<W: Write>(
    out: &mut W,
    record: &TrackingRecord,
    display: StrideDisplay,
) -> io::Result<()> {
    let table = record.strides();

    write!(out, "Memory Steps:")?;
    for slot in table {
        write!(out, " {}", display.format(slot.stride))?;
    }
    writeln!(out)?;

    write!(out, "Memory Step Proportions:")?;
    for slot in table {
        write!(out, " {}", slot.count)?;
    }
    writeln!(out)?;

    if table.dropped() > 0 {
        writeln!(out, "Dropped Steps: {}", table.dropped())?;
    }
    Ok(())
}

/// Write reports for several records in order.
///
/// # Errors
///
/// Stops at the first record that fails to render.
pub fn write_reports<'a, W, I>(
    out: &mut W,
    records: I,
    config: &ReportConfig,
) -> Result<(), ReportError>
where
    W: Write,
    I: IntoIterator<Item = &'a TrackingRecord>,
{
    for record in records {
        write_report(out, record, config)?;
    }
    Ok(())
}

/// Render one report into a string.
///
/// # Errors
///
/// Returns an error if the record was not finished.
pub fn render_to_string(
    record: &TrackingRecord,
    config: &ReportConfig,
) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_report(&mut buf, record, config)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
