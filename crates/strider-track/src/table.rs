//! Fixed-capacity stride histogram.
//!
//! Slots are assigned in first-seen order and never reordered or evicted.
//! Once every slot holds a stride, occurrences of strides not already in the
//! table are dropped and counted in [`StrideTable::dropped`].

use std::fmt;

/// Number of distinct strides a table can hold.
pub const STRIDE_TABLE_CAPACITY: usize = 1024;

/// Address distance between two consecutive accesses.
///
/// Stored as the 64-bit wrapping difference `current - last`, so an address
/// that moves backwards produces a very large unsigned value. The signed view
/// reinterprets the same bits as two's complement (`-4` for a reverse walk
/// over 4-byte elements).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stride(u64);

impl Stride {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(step: u64) -> Self {
        Self(step)
    }

    /// Stride from `last` to `current` with address-width wraparound.
    #[must_use]
    pub const fn between(last: u64, current: u64) -> Self {
        Self(current.wrapping_sub(last))
    }

    #[must_use]
    pub const fn as_unsigned(self) -> u64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_signed(self) -> i64 {
        self.0 as i64
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Stride {
    fn from(step: u64) -> Self {
        Self(step)
    }
}

impl fmt::Display for Stride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One histogram entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrideSlot {
    pub stride: Stride,
    pub count: u64,
}

/// What happened to a stride offered to the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Zero step; the table was not touched.
    Unchanged,
    /// An existing slot's count was incremented.
    Incremented,
    /// The stride took the next free slot.
    Inserted,
    /// The table was full and the stride was not in it.
    Dropped,
}

/// Histogram of strides with [`STRIDE_TABLE_CAPACITY`] slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrideTable {
    slots: Box<[StrideSlot]>,
    occupied: usize,
    dropped: u64,
}

impl Default for StrideTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StrideTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![StrideSlot::default(); STRIDE_TABLE_CAPACITY].into_boxed_slice(),
            occupied: 0,
            dropped: 0,
        }
    }

    /// Count one occurrence of `stride`.
    ///
    /// Occupied slots are scanned in order; a match is incremented, otherwise
    /// the stride claims the first free slot. Zero strides are ignored.
    pub fn insert(&mut self, stride: Stride) -> SlotOutcome {
        if stride.is_zero() {
            return SlotOutcome::Unchanged;
        }

        if let Some(slot) = self.slots[..self.occupied]
            .iter_mut()
            .find(|slot| slot.stride == stride)
        {
            slot.count += 1;
            return SlotOutcome::Incremented;
        }

        if self.occupied == self.slots.len() {
            self.dropped += 1;
            return SlotOutcome::Dropped;
        }

        self.slots[self.occupied] = StrideSlot { stride, count: 1 };
        self.occupied += 1;
        SlotOutcome::Inserted
    }

    /// Slot with the highest count; the earliest slot wins ties.
    #[must_use]
    pub fn dominant(&self) -> Option<StrideSlot> {
        let mut best: Option<StrideSlot> = None;
        for slot in self.iter() {
            if best.is_none_or(|b| slot.count > b.count) {
                best = Some(*slot);
            }
        }
        best
    }

    /// Occurrence count for `stride`, if it holds a slot.
    #[must_use]
    pub fn count(&self, stride: Stride) -> Option<u64> {
        self.iter()
            .find(|slot| slot.stride == stride)
            .map(|slot| slot.count)
    }

    /// Occupied slots in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, StrideSlot> {
        self.slots[..self.occupied].iter()
    }

    /// Number of distinct strides held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occurrences lost because the table was full.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Reset every slot and the drop counter.
    pub fn clear(&mut self) {
        self.slots.fill(StrideSlot::default());
        self.occupied = 0;
        self.dropped = 0;
    }
}

impl<'a> IntoIterator for &'a StrideTable {
    type Item = &'a StrideSlot;
    type IntoIter = std::slice::Iter<'a, StrideSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
