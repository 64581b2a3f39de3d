//! Owning handle over a single [`TrackingRecord`].

use crate::record::{StrideSummary, TrackingRecord};
use crate::table::SlotOutcome;

/// Tracks the accesses of one variable.
///
/// ```
/// use strider_track::{Stride, StrideTracker};
///
/// let mut tracker = StrideTracker::begin("x", 1000);
/// tracker.record(1004);
/// tracker.record(1008);
/// tracker.record(1020);
///
/// let summary = tracker.finish();
/// assert_eq!(summary.dominant_stride, Stride::new(4));
/// assert_eq!(summary.variable_size, 20);
/// ```
#[derive(Clone, Debug)]
pub struct StrideTracker {
    record: TrackingRecord,
}

impl StrideTracker {
    /// Bind a tracker to a variable's starting address.
    #[must_use]
    pub fn begin(label: &str, start_address: u64) -> Self {
        Self {
            record: TrackingRecord::begin(label, start_address),
        }
    }

    /// Bind a tracker to the address of a live value.
    #[must_use]
    pub fn begin_at<T: ?Sized>(label: &str, value: *const T) -> Self {
        Self::begin(label, pointer_address(value))
    }

    #[must_use]
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.record.set_owner(owner);
        self
    }

    #[inline]
    pub fn record(&mut self, address: u64) -> SlotOutcome {
        self.record.record_access(address)
    }

    /// Record an access through a pointer.
    #[inline]
    pub fn record_at<T: ?Sized>(&mut self, value: *const T) -> SlotOutcome {
        self.record(pointer_address(value))
    }

    pub fn finish(&mut self) -> &StrideSummary {
        self.record.finish()
    }

    #[must_use]
    pub const fn tracking_record(&self) -> &TrackingRecord {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> TrackingRecord {
        self.record
    }
}

fn pointer_address<T: ?Sized>(value: *const T) -> u64 {
    value.cast::<()>().addr() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Stride;

    #[test]
    fn test_tracker_lifecycle() {
        let mut tracker = StrideTracker::begin("x", 1000).with_owner("main");
        tracker.record(1004);
        tracker.record(1008);
        tracker.record(1020);
        let summary = *tracker.finish();

        let record = tracker.into_record();
        assert_eq!(record.owner().as_str(), "main");
        assert_eq!(record.accessed(), 3);
        assert_eq!(summary.dominant_stride, Stride::new(4));
    }

    #[test]
    fn test_pointer_walk_over_array() {
        let data = [0u32; 16];
        let mut tracker = StrideTracker::begin_at("data", data.as_ptr());
        for item in data.iter().skip(1) {
            tracker.record_at(std::ptr::from_ref(item));
        }
        let summary = tracker.finish();
        assert_eq!(summary.dominant_stride, Stride::new(4));
        assert_eq!(summary.variable_size, 15 * 4);
        assert!((summary.dominant_stride_fraction - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_accessed_counts_every_call() {
        let mut tracker = StrideTracker::begin("z", 64);
        for addr in [64, 64, 72, 72, 80] {
            tracker.record(addr);
        }
        assert_eq!(tracker.tracking_record().accessed(), 5);
    }
}
