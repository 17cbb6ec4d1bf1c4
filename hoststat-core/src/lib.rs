//! Core library for host utilization sampling: the snapshot wire model and the collector
//! that fills it from a GPU query tool and OS counters.

mod collector;
mod error;
mod models;

pub use collector::{
    mib_label, parse_gpu_line, parse_gpu_output, percent_label, Collector, GpuQuery,
    DEFAULT_CPU_SAMPLE, DEFAULT_GPU_QUERY_PROGRAM, DEFAULT_GPU_QUERY_TIMEOUT,
};
pub use error::{CollectError, Result};
pub use models::{CpuStats, GpuReading, RamStats, StatsReport, SystemSnapshot};
