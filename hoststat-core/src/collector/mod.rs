use crate::error::{CollectError, Result};
use crate::models::{StatsReport, SystemSnapshot};
use std::time::Duration;
use tracing::{debug, warn};

mod gpu;
mod stats;

pub use gpu::{
    parse_gpu_line, parse_gpu_output, GpuQuery, DEFAULT_GPU_QUERY_PROGRAM,
    DEFAULT_GPU_QUERY_TIMEOUT,
};
pub use stats::{mib_label, percent_label};

/// CPU usage is averaged over this window unless configured otherwise.
pub const DEFAULT_CPU_SAMPLE: Duration = Duration::from_secs(1);

/// 按请求采集主机利用率：GPU 查询子进程 + 操作系统 CPU/内存计数器。
///
/// Holds configuration only. Every call builds its own OS reader, so concurrent requests
/// share nothing.
#[derive(Debug, Clone)]
pub struct Collector {
    gpu_query: GpuQuery,
    cpu_sample: Duration,
}

impl Collector {
    pub fn new(gpu_query: GpuQuery) -> Self {
        Self::with_cpu_sample(gpu_query, DEFAULT_CPU_SAMPLE)
    }

    pub fn with_cpu_sample(gpu_query: GpuQuery, cpu_sample: Duration) -> Self {
        Self {
            gpu_query,
            cpu_sample,
        }
    }

    /// Run the full sequence (GPU, CPU, RAM). Takes at least the CPU sample window; the OS
    /// counters are read on a blocking worker.
    pub async fn collect(&self) -> Result<StatsReport> {
        let gpu_stats = self.query_gpus().await?;
        let collector = self.clone();
        let (cpu_stats, ram_stats) = tokio::task::spawn_blocking(move || {
            Ok::<_, CollectError>((collector.sample_cpu()?, collector.read_ram()?))
        })
        .await
        .map_err(|e| CollectError::Aborted(e.to_string()))??;
        Ok(StatsReport {
            gpu_stats,
            cpu_stats,
            ram_stats,
        })
    }

    /// Collect and fold any failure into an error snapshot.
    pub async fn snapshot(&self) -> SystemSnapshot {
        match self.collect().await {
            Ok(report) => {
                debug!(gpus = report.gpu_stats.len(), "snapshot collected");
                report.into()
            }
            Err(e) => {
                warn!(error = %e, "snapshot collection failed");
                SystemSnapshot::error(e.to_string())
            }
        }
    }
}
