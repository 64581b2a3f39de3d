use std::io;
use std::ops::Range;

use strider::{AccessFilter, CountingTracer, ReportConfig, Tracer, WatchTracer, write_report};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Walk a synthetic variable with a fixed stride and report it.
pub fn cmd_demo(
    base: u64,
    stride: i64,
    count: u64,
    filter: AccessFilter,
    config: &ReportConfig,
) -> i32 {
    let (watch, counting) = walk(base, stride, count, filter);

    info!(
        reads = counting.mem_reads,
        writes = counting.mem_writes,
        ignored = watch.ignored(),
        "demo walk complete"
    );

    let record = watch.into_record();
    strider::metrics::record_variable(&record);

    match write_report(&mut io::stdout().lock(), &record, config) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{e}");
            EXIT_FAILURE
        }
    }
}

/// Address window covering `base` and `count` steps of `stride`.
///
/// A walk that wraps the address space watches everything.
fn walk_window(base: u64, stride: i64, count: u64) -> Range<u64> {
    let end = i128::from(stride)
        .saturating_mul(i128::from(count))
        .saturating_add(i128::from(base));
    match u64::try_from(end) {
        Ok(last) => base.min(last)..base.max(last).saturating_add(1),
        Err(_) => 0..u64::MAX,
    }
}

/// Drive a watch and a counting tracer over the walk.
///
/// Addresses are generated on the fly. Even-numbered accesses are reads and
/// odd-numbered ones writes, so the filter has something to select.
#[allow(clippy::cast_possible_wrap)]
fn walk(
    base: u64,
    stride: i64,
    count: u64,
    filter: AccessFilter,
) -> (WatchTracer, CountingTracer) {
    let mut watch = WatchTracer::anchored("demo", base, walk_window(base, stride, count))
        .with_owner("demo_walk")
        .with_filter(filter);
    let mut counting = CountingTracer::default();

    {
        let mut tracers: [&mut dyn Tracer; 2] = [&mut watch, &mut counting];
        for i in 1..=count {
            let addr = base.wrapping_add_signed(stride.wrapping_mul(i as i64));
            let pc = 0x1000_u64.wrapping_add(i.wrapping_mul(4));
            for tracer in &mut tracers {
                if i % 2 == 1 {
                    tracer.trace_mem_read(pc, addr, 8);
                } else {
                    tracer.trace_mem_write(pc, addr, 8);
                }
            }
        }
        for tracer in &mut tracers {
            tracer.finalize();
        }
    }
    (watch, counting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider::Stride;

    #[test]
    fn test_walk_window_forward_and_backward() {
        assert_eq!(walk_window(0x1000, 8, 4), 0x1000..0x1021);
        assert_eq!(walk_window(0x1000, -8, 4), 0xfe0..0x1001);
        assert_eq!(walk_window(0x1000, 8, 0), 0x1000..0x1001);
    }

    #[test]
    fn test_walk_window_huge_count() {
        // Computed without visiting any address.
        let count = u64::MAX / 16;
        assert_eq!(walk_window(0, 8, count), 0..count * 8 + 1);
        assert_eq!(walk_window(0x10, -8, count), 0..u64::MAX);
    }

    #[test]
    fn test_backward_walk() {
        let (watch, counting) = walk(0x2000, -4, 16, AccessFilter::Both);
        assert_eq!(counting.mem_reads + counting.mem_writes, 16);
        assert_eq!(watch.ignored(), 0);

        let summary = watch.summary().unwrap();
        assert_eq!(summary.accessed, 16);
        assert_eq!(summary.dominant_stride.as_signed(), -4);
        assert_eq!(summary.dominant_stride, Stride::new(4u64.wrapping_neg()));
    }

    #[test]
    fn test_walk_filter_selects_writes() {
        let (watch, counting) = walk(0, 8, 10, AccessFilter::Writes);
        assert_eq!((counting.mem_reads, counting.mem_writes), (5, 5));
        assert_eq!(watch.ignored(), 5);
        let summary = watch.summary().unwrap();
        assert_eq!(summary.accessed, 5);
        assert_eq!(summary.dominant_stride, Stride::new(16));
    }
}
