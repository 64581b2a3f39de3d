//! Memory access stride tracking for a single variable.
//!
//! A [`TrackingRecord`] is started at a variable's first address, fed every
//! address the variable is accessed at, and finally summarized into the
//! dominant stride and the fraction of accesses that used it.
//!
//! ```
//! use strider_track::StrideTracker;
//!
//! let mut tracker = StrideTracker::begin("row", 0x1000);
//! for i in 1..=8 {
//!     tracker.record(0x1000 + i * 16);
//! }
//! let summary = tracker.finish();
//! assert_eq!(summary.dominant_stride.as_unsigned(), 16);
//! ```
//!
//! # Capacity
//!
//! The stride histogram holds [`STRIDE_TABLE_CAPACITY`] distinct strides.
//! Further distinct strides are dropped and counted in
//! [`StrideTable::dropped`]; existing strides keep counting.

mod label;
mod record;
mod table;
mod tracer;
mod tracker;

pub use label::{LABEL_CAPACITY, Label};
pub use record::{StrideSummary, TrackingRecord};
pub use table::{STRIDE_TABLE_CAPACITY, SlotOutcome, Stride, StrideSlot, StrideTable};
pub use tracer::{AccessFilter, CountingTracer, Tracer, WatchTracer};
pub use tracker::StrideTracker;
