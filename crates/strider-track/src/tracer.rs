//! Memory tracer hooks feeding stride trackers.
//!
//! An execution engine calls a [`Tracer`] on every memory access it performs.
//! [`WatchTracer`] narrows that stream to one variable's address window and
//! records the accesses that fall inside it.

use std::ops::Range;

use crate::record::{StrideSummary, TrackingRecord};
use crate::tracker::StrideTracker;

/// Tracer behavior trait.
///
/// All methods have default no-op implementations, so you only need to
/// implement the ones you care about.
pub trait Tracer: Send {
    /// Called on memory read of `width` bytes.
    fn trace_mem_read(&mut self, _pc: u64, _addr: u64, _width: u8) {}

    /// Called on memory write of `width` bytes.
    fn trace_mem_write(&mut self, _pc: u64, _addr: u64, _width: u8) {}

    /// Called at end of execution.
    fn finalize(&mut self) {}
}

/// Which access kinds a [`WatchTracer`] records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessFilter {
    Reads,
    Writes,
    #[default]
    Both,
}

impl AccessFilter {
    const fn accepts_reads(self) -> bool {
        matches!(self, Self::Reads | Self::Both)
    }

    const fn accepts_writes(self) -> bool {
        matches!(self, Self::Writes | Self::Both)
    }
}

/// Records accesses to a single variable's address window.
///
/// Strides are measured from `window.start` unless the tracer is
/// [`anchored`](Self::anchored) elsewhere. Accesses outside the window are
/// counted as ignored and do not touch the record.
#[derive(Debug)]
pub struct WatchTracer {
    tracker: StrideTracker,
    window: Range<u64>,
    filter: AccessFilter,
    ignored: u64,
}

impl WatchTracer {
    #[must_use]
    pub fn new(label: &str, window: Range<u64>) -> Self {
        Self::anchored(label, window.start, window)
    }

    /// Watch `window` but start measuring strides from `start_address`.
    ///
    /// Used for variables walked from their high end downwards.
    #[must_use]
    pub fn anchored(label: &str, start_address: u64, window: Range<u64>) -> Self {
        Self {
            tracker: StrideTracker::begin(label, start_address),
            window,
            filter: AccessFilter::default(),
            ignored: 0,
        }
    }

    #[must_use]
    pub const fn with_filter(mut self, filter: AccessFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.tracker = self.tracker.with_owner(owner);
        self
    }

    /// Whether `addr` lies in the watched window.
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        self.window.contains(&addr)
    }

    /// Accesses seen outside the window or rejected by the filter.
    #[must_use]
    pub const fn ignored(&self) -> u64 {
        self.ignored
    }

    #[must_use]
    pub const fn tracking_record(&self) -> &TrackingRecord {
        self.tracker.tracking_record()
    }

    /// Summary computed by the last `finalize`, if any.
    #[must_use]
    pub const fn summary(&self) -> Option<&StrideSummary> {
        self.tracker.tracking_record().summary()
    }

    #[must_use]
    pub fn into_record(self) -> TrackingRecord {
        self.tracker.into_record()
    }

    fn observe(&mut self, accepted: bool, addr: u64) {
        if accepted && self.contains(addr) {
            self.tracker.record(addr);
        } else {
            self.ignored += 1;
        }
    }
}

impl Tracer for WatchTracer {
    fn trace_mem_read(&mut self, _pc: u64, addr: u64, _width: u8) {
        self.observe(self.filter.accepts_reads(), addr);
    }

    fn trace_mem_write(&mut self, _pc: u64, addr: u64, _width: u8) {
        self.observe(self.filter.accepts_writes(), addr);
    }

    fn finalize(&mut self) {
        let summary = *self.tracker.finish();
        tracing::debug!(
            variable = %self.tracker.tracking_record().label(),
            accessed = summary.accessed,
            ignored = self.ignored,
            "watch tracer finalized"
        );
    }
}

/// Counting tracer - counts events.
#[derive(Debug, Default)]
pub struct CountingTracer {
    pub mem_reads: u64,
    pub mem_writes: u64,
}

impl Tracer for CountingTracer {
    fn trace_mem_read(&mut self, _pc: u64, _addr: u64, _width: u8) {
        self.mem_reads += 1;
    }

    fn trace_mem_write(&mut self, _pc: u64, _addr: u64, _width: u8) {
        self.mem_writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Stride;

    #[test]
    fn test_counting_tracer() {
        let mut tracer = CountingTracer::default();
        tracer.trace_mem_read(0x1000, 0x8000, 4);
        tracer.trace_mem_write(0x1004, 0x8004, 4);
        tracer.trace_mem_write(0x1008, 0x8008, 4);

        assert_eq!(tracer.mem_reads, 1);
        assert_eq!(tracer.mem_writes, 2);
    }

    #[test]
    fn test_watch_tracer_ignores_outside_window() {
        let mut tracer = WatchTracer::new("buf", 0x8000..0x8040);
        tracer.trace_mem_read(0, 0x8008, 8);
        tracer.trace_mem_read(0, 0x9000, 8);
        tracer.trace_mem_read(0, 0x8010, 8);
        tracer.finalize();

        assert_eq!(tracer.ignored(), 1);
        let summary = tracer.summary().unwrap();
        assert_eq!(summary.accessed, 2);
        assert_eq!(summary.dominant_stride, Stride::new(8));
        assert_eq!(summary.variable_size, 0x10);
    }

    #[test]
    fn test_watch_tracer_filter() {
        let mut tracer =
            WatchTracer::new("buf", 0x100..0x200).with_filter(AccessFilter::Writes);
        tracer.trace_mem_read(0, 0x104, 4);
        tracer.trace_mem_write(0, 0x108, 4);
        tracer.trace_mem_write(0, 0x110, 4);
        tracer.finalize();

        let record = tracer.into_record();
        assert_eq!(record.accessed(), 2);
        assert_eq!(record.strides().count(Stride::new(8)), Some(2));
    }

    #[test]
    fn test_anchored_reverse_walk() {
        let mut tracer = WatchTracer::anchored("rev", 0x1000, 0xf00..0x1001);
        for i in 1..=4u64 {
            tracer.trace_mem_read(0, 0x1000 - i * 8, 8);
        }
        tracer.finalize();

        let summary = tracer.summary().unwrap();
        assert_eq!(summary.accessed, 4);
        assert_eq!(summary.dominant_stride.as_signed(), -8);
        assert_eq!(tracer.ignored(), 0);
    }

    #[test]
    fn test_dyn_tracer_dispatch() {
        fn drive(tracer: &mut dyn Tracer) {
            tracer.trace_mem_read(0, 4, 4);
            tracer.trace_mem_write(4, 12, 4);
            tracer.trace_mem_read(8, 20, 4);
            tracer.trace_mem_write(12, 128, 4);
            tracer.finalize();
        }

        let mut watch = WatchTracer::new("v", 0..64);
        drive(&mut watch);
        let summary = *watch.summary().unwrap();
        assert_eq!(summary.accessed, 3);
        assert_eq!(summary.dominant_stride, Stride::new(8));
        assert_eq!(watch.ignored(), 1);

        let mut counting = CountingTracer::default();
        drive(&mut counting);
        assert_eq!((counting.mem_reads, counting.mem_writes), (2, 2));
    }
}
