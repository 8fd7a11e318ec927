//! Readers for the two kernel files the agent depends on.
//!
//! Format of /proc/meminfo:
//!   MemTotal:       16315592 kB
//!   MemFree:         1092468 kB
//!   MemAvailable:    9866172 kB
//!
//! Format of the first line of /proc/stat (ticks since boot, all cores):
//!   cpu  user nice system idle iowait irq softirq steal guest guest_nice
//!
//! Nothing here returns an error. A missing file reads as zeros and a
//! malformed counter counts as 0, so a broken /proc never takes the agent down.

use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::types::{CpuSnapshot, MemorySnapshot};

pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";
pub const DEFAULT_STAT_PATH: &str = "/proc/stat";

/// Position of the idle counter on the `cpu` line. Index 0 is the label.
pub const IDLE_COLUMN: usize = 4;
/// Position of the iowait counter on the `cpu` line.
pub const IOWAIT_COLUMN: usize = 5;

const MEM_TOTAL_KEY: &str = "MemTotal:";
const MEM_AVAILABLE_KEY: &str = "MemAvailable:";

/// Reads memory and CPU counters. Every call opens the file again; nothing is cached.
#[derive(Debug, Clone)]
pub struct StatReader {
    meminfo_path: PathBuf,
    stat_path: PathBuf,
}

impl Default for StatReader {
    fn default() -> Self {
        Self::new(DEFAULT_MEMINFO_PATH, DEFAULT_STAT_PATH)
    }
}

impl StatReader {
    pub fn new(meminfo_path: impl Into<PathBuf>, stat_path: impl Into<PathBuf>) -> Self {
        Self {
            meminfo_path: meminfo_path.into(),
            stat_path: stat_path.into(),
        }
    }

    pub fn read_memory(&self) -> MemorySnapshot {
        match std::fs::read_to_string(&self.meminfo_path) {
            Ok(content) => parse_meminfo(&content),
            Err(err) => {
                debug!(
                    "[procfs] failed to read {}: {}",
                    self.meminfo_path.display(),
                    err
                );
                MemorySnapshot::default()
            }
        }
    }

    pub fn read_cpu_times(&self) -> CpuSnapshot {
        match read_first_line(&self.stat_path) {
            Ok(Some(line)) => parse_cpu_line(&line),
            Ok(None) => {
                debug!("[procfs] {} is empty", self.stat_path.display());
                CpuSnapshot::default()
            }
            Err(err) => {
                debug!(
                    "[procfs] failed to read {}: {}",
                    self.stat_path.display(),
                    err
                );
                CpuSnapshot::default()
            }
        }
    }
}

fn read_first_line(path: &Path) -> io::Result<Option<String>> {
    let reader = BufReader::new(File::open(path)?);
    reader.lines().next().transpose()
}

/// Extract MemTotal and MemAvailable. Lines with fewer than two fields and
/// unknown keys are skipped.
pub fn parse_meminfo(content: &str) -> MemorySnapshot {
    let mut snapshot = MemorySnapshot::default();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };

        match key {
            MEM_TOTAL_KEY => snapshot.total_kb = parse_counter(value),
            MEM_AVAILABLE_KEY => snapshot.available_kb = parse_counter(value),
            _ => {}
        }
    }

    snapshot
}

/// Sum the tick counters of an aggregate `cpu` line.
///
/// Input: "cpu  100 0 0 200 50 0 0 0"
/// Output: CpuSnapshot { idle: 250, total: 350 }
pub fn parse_cpu_line(line: &str) -> CpuSnapshot {
    let mut snapshot = CpuSnapshot::default();

    for (column, field) in line.split_whitespace().enumerate().skip(1) {
        let ticks = parse_counter(field);
        snapshot.total = snapshot.total.wrapping_add(ticks);
        if column == IDLE_COLUMN || column == IOWAIT_COLUMN {
            snapshot.idle = snapshot.idle.wrapping_add(ticks);
        }
    }

    snapshot
}

fn parse_counter(field: &str) -> u64 {
    field.parse::<u64>().unwrap_or(0)
}
