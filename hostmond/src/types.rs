/// Cumulative CPU tick counters taken from the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub idle: u64,  // idle + iowait ticks
    pub total: u64, // every tick column summed
}

/// Memory figures from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemorySnapshot {
    /// Memory in use. Reported as 0 when the kernel claims more available than total.
    pub fn used_kb(&self) -> u64 {
        self.total_kb.saturating_sub(self.available_kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_is_total_minus_available() {
        let mem = MemorySnapshot {
            total_kb: 1000,
            available_kb: 400,
        };
        assert_eq!(mem.used_kb(), 600);
    }

    #[test]
    fn used_never_goes_negative() {
        let mem = MemorySnapshot {
            total_kb: 100,
            available_kb: 400,
        };
        assert_eq!(mem.used_kb(), 0);
    }
}
