//! Per-variable tracking record and its finalized summary.

use crate::label::Label;
use crate::table::{SlotOutcome, Stride, StrideTable};

/// Statistics computed by [`TrackingRecord::finish`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrideSummary {
    /// Byte distance from the first to the last observed address.
    pub variable_size: u64,
    /// Number of accesses the summary was computed over.
    pub accessed: u64,
    /// Most frequent stride, or zero when no nonzero stride was seen.
    pub dominant_stride: Stride,
    /// Occurrences of the dominant stride.
    pub dominant_count: u64,
    /// `dominant_count / accessed`, in `[0, 1]`; zero when nothing was accessed.
    pub dominant_stride_fraction: f64,
}

impl StrideSummary {
    /// True when the record saw no accesses before finishing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.accessed == 0
    }
}

/// Access history of one tracked variable.
///
/// Lifecycle is `begin` → `record_access`* → `finish`. The table and counters
/// are mutated only by `record_access`; `finish` derives the summary.
#[derive(Clone, Debug)]
pub struct TrackingRecord {
    label: Label,
    owner: Label,
    address_begin: u64,
    address_end: Option<u64>,
    accessed: u64,
    strides: StrideTable,
    summary: Option<StrideSummary>,
}

impl TrackingRecord {
    /// Start tracking `label` at `start_address`.
    #[must_use]
    pub fn begin(label: &str, start_address: u64) -> Self {
        Self {
            label: Label::new(label),
            owner: Label::default(),
            address_begin: start_address,
            address_end: None,
            accessed: 0,
            strides: StrideTable::new(),
            summary: None,
        }
    }

    /// Set the enclosing function or context name.
    #[must_use]
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.set_owner(owner);
        self
    }

    pub fn set_owner(&mut self, owner: &str) {
        self.owner = Label::new(owner);
    }

    /// Record one access at `address`.
    ///
    /// The stride is measured from the previous access, or from the start
    /// address for the first one.
    pub fn record_access(&mut self, address: u64) -> SlotOutcome {
        let last = self.address_end.unwrap_or(self.address_begin);
        let stride = Stride::between(last, address);

        self.accessed += 1;
        self.address_end = Some(address);
        self.summary = None;

        let outcome = self.strides.insert(stride);
        if outcome == SlotOutcome::Dropped && self.strides.dropped() == 1 {
            tracing::warn!(
                variable = %self.label,
                stride = stride.as_unsigned(),
                "stride table full, dropping new strides"
            );
        }
        outcome
    }

    /// Compute the summary from the current table and counters.
    ///
    /// Calling this again without new accesses returns the same values.
    pub fn finish(&mut self) -> &StrideSummary {
        let variable_size = self
            .address_end
            .map_or(0, |end| end.wrapping_sub(self.address_begin));

        let (dominant_stride, dominant_count) = self
            .strides
            .dominant()
            .map_or((Stride::ZERO, 0), |slot| (slot.stride, slot.count));

        #[allow(clippy::cast_precision_loss)]
        let dominant_stride_fraction = if self.accessed == 0 {
            0.0
        } else {
            dominant_count as f64 / self.accessed as f64
        };

        self.summary.insert(StrideSummary {
            variable_size,
            accessed: self.accessed,
            dominant_stride,
            dominant_count,
            dominant_stride_fraction,
        })
    }

    #[must_use]
    pub const fn label(&self) -> &Label {
        &self.label
    }

    #[must_use]
    pub const fn owner(&self) -> &Label {
        &self.owner
    }

    #[must_use]
    pub const fn address_begin(&self) -> u64 {
        self.address_begin
    }

    /// Most recently recorded address, `None` before the first access.
    #[must_use]
    pub const fn address_end(&self) -> Option<u64> {
        self.address_end
    }

    #[must_use]
    pub const fn accessed(&self) -> u64 {
        self.accessed
    }

    #[must_use]
    pub const fn strides(&self) -> &StrideTable {
        &self.strides
    }

    /// Summary from the last `finish`, cleared by any later access.
    #[must_use]
    pub const fn summary(&self) -> Option<&StrideSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.summary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::STRIDE_TABLE_CAPACITY;

    #[test]
    fn test_begin_resets_state() {
        let record = TrackingRecord::begin("x", 0x1000);
        assert_eq!(record.label().as_str(), "x");
        assert!(record.owner().is_empty());
        assert_eq!(record.address_begin(), 0x1000);
        assert_eq!(record.address_end(), None);
        assert_eq!(record.accessed(), 0);
        assert!(record.strides().is_empty());
        assert!(!record.is_finished());
    }

    #[test]
    fn test_mixed_strides() {
        let mut record = TrackingRecord::begin("x", 1000);
        record.record_access(1004);
        record.record_access(1008);
        record.record_access(1020);

        let summary = *record.finish();
        assert_eq!(summary.accessed, 3);
        assert_eq!(summary.variable_size, 20);
        assert_eq!(summary.dominant_stride, Stride::new(4));
        assert_eq!(summary.dominant_count, 2);
        assert!((summary.dominant_stride_fraction - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(record.strides().len(), 2);
        assert_eq!(record.strides().count(Stride::new(4)), Some(2));
        assert_eq!(record.strides().count(Stride::new(12)), Some(1));
    }

    #[test]
    fn test_same_address_counts_without_stride() {
        let mut record = TrackingRecord::begin("y", 500);
        assert_eq!(record.record_access(500), SlotOutcome::Unchanged);
        assert_eq!(record.accessed(), 1);
        assert!(record.strides().is_empty());
        assert_eq!(record.address_end(), Some(500));
    }

    #[test]
    fn test_constant_stride_is_fully_dominant() {
        let mut record = TrackingRecord::begin("arr", 0x8000);
        for i in 1..=100u64 {
            record.record_access(0x8000 + i * 8);
        }
        let summary = record.finish();
        assert_eq!(summary.dominant_stride, Stride::new(8));
        assert!((summary.dominant_stride_fraction - 1.0).abs() < f64::EPSILON);
        assert_eq!(summary.variable_size, 800);
    }

    #[test]
    fn test_finish_without_accesses_is_zero() {
        let mut record = TrackingRecord::begin("empty", 0x4000);
        let summary = *record.finish();
        assert!(summary.is_empty());
        assert_eq!(summary.variable_size, 0);
        assert_eq!(summary.dominant_stride, Stride::ZERO);
        assert!(summary.dominant_stride_fraction.is_finite());
        assert!(summary.dominant_stride_fraction.abs() < f64::EPSILON);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut record = TrackingRecord::begin("x", 0);
        record.record_access(16);
        record.record_access(32);
        record.record_access(40);
        let first = *record.finish();
        let second = *record.finish();
        assert_eq!(first, second);
    }

    #[test]
    fn test_access_after_finish_clears_summary() {
        let mut record = TrackingRecord::begin("x", 0);
        record.record_access(4);
        record.finish();
        assert!(record.is_finished());
        record.record_access(8);
        assert!(record.summary().is_none());
    }

    #[test]
    fn test_capacity_overflow_keeps_counting_accesses() {
        let mut record = TrackingRecord::begin("wide", 0);
        let mut addr = 0u64;
        // Strides 1, 2, ..., N + 1 are all distinct
        for step in 1..=(STRIDE_TABLE_CAPACITY as u64 + 1) {
            addr += step;
            record.record_access(addr);
        }
        assert_eq!(record.accessed(), STRIDE_TABLE_CAPACITY as u64 + 1);
        assert_eq!(record.strides().len(), STRIDE_TABLE_CAPACITY);
        assert_eq!(record.strides().dropped(), 1);
        assert_eq!(
            record.strides().count(Stride::new(STRIDE_TABLE_CAPACITY as u64 + 1)),
            None
        );
    }

    #[test]
    fn test_reverse_walk_wraps() {
        let mut record = TrackingRecord::begin("rev", 1000);
        record.record_access(996);
        record.record_access(992);
        let summary = *record.finish();
        assert_eq!(summary.dominant_stride.as_unsigned(), u64::MAX - 3);
        assert_eq!(summary.dominant_stride.as_signed(), -4);
        // Extent is also a wrapping difference
        assert_eq!(summary.variable_size, 992u64.wrapping_sub(1000));
    }

    #[test]
    fn test_address_zero_is_a_real_address() {
        let mut record = TrackingRecord::begin("low", 8);
        record.record_access(0);
        record.record_access(8);
        assert_eq!(record.address_end(), Some(8));
        // Second stride is measured from 0, not from the start address
        assert_eq!(record.strides().count(Stride::new(8)), Some(1));
        assert_eq!(record.strides().len(), 2);
    }

    #[test]
    fn test_owner_label() {
        let record = TrackingRecord::begin("x", 0).with_owner("kernel_main");
        assert_eq!(record.owner().as_str(), "kernel_main");
    }
}
