use serde::{Deserialize, Serialize};

/// One GPU as reported by the query tool, values already carrying their units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GpuReading {
    pub name: String,
    /// e.g. `"45%"`
    pub utilization: String,
    /// e.g. `"1024 MiB"`
    pub memory_used: String,
    pub memory_total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CpuStats {
    pub cpu_utilization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RamStats {
    pub ram_used: String,
    pub ram_total: String,
    pub ram_utilization: String,
}

/// A fully populated sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsReport {
    pub gpu_stats: Vec<GpuReading>,
    pub cpu_stats: CpuStats,
    pub ram_stats: RamStats,
}

/// What `GET /system_stats` returns: either a complete report or `{ "error": ... }`.
///
/// Untagged so the JSON carries no discriminator. `Error` is tried first, which means any
/// body with an `error` key is treated as unusable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SystemSnapshot {
    Error { error: String },
    Stats(StatsReport),
}

impl SystemSnapshot {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Stats(_) => None,
        }
    }

    pub fn report(&self) -> Option<&StatsReport> {
        match self {
            Self::Stats(report) => Some(report),
            Self::Error { .. } => None,
        }
    }
}

impl From<StatsReport> for SystemSnapshot {
    fn from(report: StatsReport) -> Self {
        Self::Stats(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> StatsReport {
        StatsReport {
            gpu_stats: vec![GpuReading {
                name: "NVIDIA GeForce RTX 3090".into(),
                utilization: "45%".into(),
                memory_used: "1024 MiB".into(),
                memory_total: "24576 MiB".into(),
            }],
            cpu_stats: CpuStats {
                cpu_utilization: "12.5%".into(),
            },
            ram_stats: RamStats {
                ram_used: "4096 MiB".into(),
                ram_total: "8192 MiB".into(),
                ram_utilization: "50.0%".into(),
            },
        }
    }

    #[test]
    fn stats_serialize_to_documented_shape() {
        let value = serde_json::to_value(SystemSnapshot::from(report())).unwrap();
        assert_eq!(
            value,
            json!({
                "gpu_stats": [{
                    "name": "NVIDIA GeForce RTX 3090",
                    "utilization": "45%",
                    "memory_used": "1024 MiB",
                    "memory_total": "24576 MiB"
                }],
                "cpu_stats": { "cpu_utilization": "12.5%" },
                "ram_stats": {
                    "ram_used": "4096 MiB",
                    "ram_total": "8192 MiB",
                    "ram_utilization": "50.0%"
                }
            })
        );
    }

    #[test]
    fn error_snapshot_has_only_error_key() {
        let value = serde_json::to_value(SystemSnapshot::error("boom")).unwrap();
        assert_eq!(value, json!({ "error": "boom" }));
    }

    #[test]
    fn error_key_wins_on_decode() {
        let snapshot: SystemSnapshot =
            serde_json::from_value(json!({ "error": "nvidia-smi missing" })).unwrap();
        assert_eq!(snapshot.error_message(), Some("nvidia-smi missing"));
        assert!(snapshot.report().is_none());
    }

    #[test]
    fn missing_sections_fail_to_decode() {
        let partial = json!({
            "gpu_stats": [],
            "cpu_stats": { "cpu_utilization": "3.0%" }
        });
        assert!(serde_json::from_value::<SystemSnapshot>(partial).is_err());
    }
}
