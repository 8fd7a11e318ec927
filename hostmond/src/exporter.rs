//! Plain-text metrics payload served on `/metrics`.
//!
//! One `<name> <value>` line per metric, fixed order, no HELP/TYPE lines:
//!   agent_uptime_seconds 3600
//!   process_threads 9
//!   process_pid 4242
//!   node_memory_total_kb 16315592
//!   node_memory_used_kb 6449420
//!   node_memory_available_kb 9866172
//!   node_cpu_usage_percent 12.37

use log::debug;
use std::fmt::Write as _;

use crate::api::AppState;
use crate::sampler;
use crate::types::MemorySnapshot;

pub const UPTIME_METRIC: &str = "agent_uptime_seconds";
pub const THREADS_METRIC: &str = "process_threads";
pub const PID_METRIC: &str = "process_pid";
pub const MEMORY_TOTAL_METRIC: &str = "node_memory_total_kb";
pub const MEMORY_USED_METRIC: &str = "node_memory_used_kb";
pub const MEMORY_AVAILABLE_METRIC: &str = "node_memory_available_kb";
pub const CPU_USAGE_METRIC: &str = "node_cpu_usage_percent";

/// Metric names in the order they are rendered.
pub const METRIC_NAMES: [&str; 7] = [
    UPTIME_METRIC,
    THREADS_METRIC,
    PID_METRIC,
    MEMORY_TOTAL_METRIC,
    MEMORY_USED_METRIC,
    MEMORY_AVAILABLE_METRIC,
    CPU_USAGE_METRIC,
];

/// Values for one `/metrics` response. Built per request and dropped after rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub uptime_secs: f64,
    pub threads: u64,
    pub pid: u32,
    pub memory: MemorySnapshot,
    pub cpu_percent: f64,
}

impl MetricsReport {
    /// Gather every metric. Takes about `SAMPLE_INTERVAL` because of the CPU sample.
    pub async fn collect(state: &AppState) -> Self {
        let uptime_secs = state.started_at.elapsed().as_secs_f64();
        let pid = std::process::id();
        let threads = thread_count();
        let cpu_percent = sampler::sample_cpu_usage_percent(&state.reader).await;
        let memory = state.reader.read_memory();

        Self {
            uptime_secs,
            threads,
            pid,
            memory,
            cpu_percent,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{UPTIME_METRIC} {:.0}", self.uptime_secs);
        let _ = writeln!(out, "{THREADS_METRIC} {}", self.threads);
        let _ = writeln!(out, "{PID_METRIC} {}", self.pid);
        let _ = writeln!(out, "{MEMORY_TOTAL_METRIC} {}", self.memory.total_kb);
        let _ = writeln!(out, "{MEMORY_USED_METRIC} {}", self.memory.used_kb());
        let _ = writeln!(
            out,
            "{MEMORY_AVAILABLE_METRIC} {}",
            self.memory.available_kb
        );
        let _ = writeln!(out, "{CPU_USAGE_METRIC} {:.2}", self.cpu_percent);
        out
    }
}

pub async fn render_metrics(state: &AppState) -> String {
    MetricsReport::collect(state).await.render()
}

/// OS threads in this process, from /proc/self/stat. 0 if unreadable.
fn thread_count() -> u64 {
    match procfs::process::Process::myself().and_then(|me| me.stat()) {
        Ok(stat) => u64::try_from(stat.num_threads).unwrap_or(0),
        Err(err) => {
            debug!("[procfs] failed to read thread count: {}", err);
            0
        }
    }
}
