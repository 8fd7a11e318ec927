//! CPU utilisation from two /proc/stat snapshots.
//!
//! Tick counters are cumulative since boot, so a single read says nothing
//! about current load. We read twice, `SAMPLE_INTERVAL` apart, and report the
//! share of the window that was not spent idle.

use log::debug;
use std::time::Duration;
use tokio::time::sleep;

use crate::procfs_reader::StatReader;
use crate::types::CpuSnapshot;

/// Fixed distance between the two snapshots.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Busy percentage in `[0, 100]` over a `SAMPLE_INTERVAL` window.
///
/// Only the calling task is suspended while waiting for the second snapshot.
pub async fn sample_cpu_usage_percent(reader: &StatReader) -> f64 {
    let before = reader.read_cpu_times();
    sleep(SAMPLE_INTERVAL).await;
    let after = reader.read_cpu_times();

    let percent = usage_between(&before, &after);
    debug!(
        "[sampler] before={:?} after={:?} usage={:.2}%",
        before, after, percent
    );
    percent
}

/// Busy percentage between two snapshots.
///
/// Returns 0 when the total counter did not advance or went backwards.
pub fn usage_between(before: &CpuSnapshot, after: &CpuSnapshot) -> f64 {
    let total_delta = signed_delta(before.total, after.total);
    if total_delta <= 0 {
        return 0.0;
    }
    let idle_delta = signed_delta(before.idle, after.idle).max(0);

    let busy = 1.0 - idle_delta as f64 / total_delta as f64;
    (100.0 * busy).clamp(0.0, 100.0)
}

// A wrapped or reset counter shows up as a negative delta.
fn signed_delta(before: u64, after: u64) -> i64 {
    after.wrapping_sub(before) as i64
}
