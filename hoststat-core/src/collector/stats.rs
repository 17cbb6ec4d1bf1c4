//! 系统资源计数器：CPU 使用率与内存

use super::*;
use crate::models::{CpuStats, RamStats};
use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

const MIB: u64 = 1024 * 1024;

impl Collector {
    /// CPU 使用率：两次刷新之间阻塞一个采样窗口，再取所有核心的平均值
    pub(super) fn sample_cpu(&self) -> Result<CpuStats> {
        let mut sys = System::new();
        let kind = RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage());

        sys.refresh_specifics(kind);
        std::thread::sleep(self.cpu_sample.max(MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_specifics(kind);

        let cpus = sys.cpus();
        if cpus.is_empty() {
            return Err(CollectError::NoCpus);
        }
        let usage = cpus.iter().map(|cpu| cpu.cpu_usage()).sum::<f32>() / cpus.len() as f32;
        Ok(CpuStats {
            cpu_utilization: percent_label(usage),
        })
    }

    pub(super) fn read_ram(&self) -> Result<RamStats> {
        let mut sys = System::new();
        sys.refresh_memory();
        ram_stats(sys.used_memory(), sys.total_memory())
    }
}

fn ram_stats(used: u64, total: u64) -> Result<RamStats> {
    if total == 0 {
        return Err(CollectError::MemoryUnavailable);
    }
    let usage = (used as f64 / total as f64 * 100.0) as f32;
    Ok(RamStats {
        ram_used: mib_label(used),
        ram_total: mib_label(total),
        ram_utilization: percent_label(usage),
    })
}

/// Whole MiB, rounded down: `8_589_934_592` → `"8192 MiB"`.
pub fn mib_label(bytes: u64) -> String {
    format!("{} MiB", bytes / MIB)
}

pub fn percent_label(value: f32) -> String {
    format!("{value:.1}%")
}
