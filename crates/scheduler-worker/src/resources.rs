//! Optional CPU/memory sampling around a job's execution, mirroring the
//! `psutil`-gated `cpu_before`/`cpu_after` averaging in the original worker
//! (`examples/original_source/fifo/worker.py`). `sysinfo` stands in for
//! `psutil` here — the pack's idiomatic choice for process/system metrics.

use sysinfo::{CpuRefreshKind, RefreshKind, System};

pub struct ResourceSampler {
    system: System,
}

pub struct Sample {
    pub cpu_percent: f32,
    pub memory_mb: f64,
}

impl ResourceSampler {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
        );
        Self { system }
    }

    pub fn sample(&mut self) -> Sample {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        let cpu_percent = self.system.global_cpu_info().cpu_usage();
        let memory_mb = self.system.used_memory() as f64 / (1024.0 * 1024.0);
        Sample {
            cpu_percent,
            memory_mb,
        }
    }
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Average of a before/after pair, same "simple approximation" the
/// original takes rather than sampling continuously during execution.
pub fn average_cpu(before: &Sample, after: &Sample) -> f64 {
    ((before.cpu_percent + after.cpu_percent) / 2.0) as f64
}

/// Peak memory of the before/after pair.
pub fn peak_memory_mb(before: &Sample, after: &Sample) -> f64 {
    before.memory_mb.max(after.memory_mb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_cpu_splits_the_difference() {
        let before = Sample { cpu_percent: 10.0, memory_mb: 100.0 };
        let after = Sample { cpu_percent: 30.0, memory_mb: 120.0 };
        assert_eq!(average_cpu(&before, &after), 20.0);
    }

    #[test]
    fn peak_memory_takes_the_larger_reading() {
        let before = Sample { cpu_percent: 0.0, memory_mb: 100.0 };
        let after = Sample { cpu_percent: 0.0, memory_mb: 90.0 };
        assert_eq!(peak_memory_mb(&before, &after), 100.0);
    }
}
