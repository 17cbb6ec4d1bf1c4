//! GPU 读数：调用外部查询工具（nvidia-smi 兼容的 CSV 输出）并严格解析。

use super::*;
use crate::models::GpuReading;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_GPU_QUERY_PROGRAM: &str = "nvidia-smi";
/// A wedged driver can leave nvidia-smi hanging; the child is killed after this long.
pub const DEFAULT_GPU_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

const NVIDIA_SMI_ARGS: [&str; 2] = [
    "--query-gpu=name,utilization.gpu,memory.used,memory.total",
    "--format=csv,noheader,nounits",
];

/// name, utilization, memory.used, memory.total
const FIELD_COUNT: usize = 4;

/// External command that prints one `name, util, used, total` line per device, no header,
/// no units.
#[derive(Debug, Clone)]
pub struct GpuQuery {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl GpuQuery {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_GPU_QUERY_TIMEOUT,
        }
    }

    pub fn nvidia_smi() -> Self {
        Self::new(DEFAULT_GPU_QUERY_PROGRAM, NVIDIA_SMI_ARGS)
    }

    /// Same arguments, different executable (e.g. an absolute path to nvidia-smi).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool and return its stdout. Missing binary, non-zero exit and a run longer
    /// than the timeout are errors.
    pub async fn run(&self) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CollectError::ToolNotFound(self.program.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(res) => res?,
            Err(_) => {
                return Err(CollectError::ToolTimedOut {
                    program: self.program.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CollectError::ToolFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                detail: if stderr.is_empty() {
                    "no output".into()
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GpuQuery {
    fn default() -> Self {
        Self::nvidia_smi()
    }
}

impl Collector {
    pub(super) async fn query_gpus(&self) -> Result<Vec<GpuReading>> {
        let stdout = self.gpu_query.run().await?;
        let readings = parse_gpu_output(&stdout)?;
        debug!(program = %self.gpu_query.program(), count = readings.len(), "gpu query ok");
        Ok(readings)
    }
}

/// Parse every non-blank line; an empty device list is an error, not an empty report.
pub fn parse_gpu_output(stdout: &str) -> Result<Vec<GpuReading>> {
    let readings = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_gpu_line)
        .collect::<Result<Vec<_>>>()?;
    if readings.is_empty() {
        return Err(CollectError::NoGpus);
    }
    Ok(readings)
}

/// Split on `,` and require exactly four fields with integer values in the last three.
pub fn parse_gpu_line(line: &str) -> Result<GpuReading> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(
            line,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }

    let name = fields[0];
    if name.is_empty() {
        return Err(malformed(line, "empty device name".into()));
    }
    let utilization = integer(line, "utilization", fields[1])?;
    let memory_used = integer(line, "memory used", fields[2])?;
    let memory_total = integer(line, "memory total", fields[3])?;

    Ok(GpuReading {
        name: name.to_string(),
        utilization: format!("{utilization}%"),
        memory_used: format!("{memory_used} MiB"),
        memory_total: format!("{memory_total} MiB"),
    })
}

fn integer(line: &str, column: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| malformed(line, format!("{column} is not an integer: {raw:?}")))
}

fn malformed(line: &str, reason: String) -> CollectError {
    CollectError::MalformedLine {
        line: line.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_with_spaces() {
        let gpu = parse_gpu_line("NVIDIA GeForce RTX 3090, 45, 1024, 24576").unwrap();
        assert_eq!(gpu.name, "NVIDIA GeForce RTX 3090");
        assert_eq!(gpu.utilization, "45%");
        assert_eq!(gpu.memory_used, "1024 MiB");
        assert_eq!(gpu.memory_total, "24576 MiB");
    }

    #[test]
    fn keeps_enumeration_order_and_skips_blank_lines() {
        let out = "Tesla T4, 0, 3, 15360\n\nNVIDIA A100-SXM4-40GB, 98, 39000, 40960\n";
        let gpus = parse_gpu_output(out).unwrap();
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].name, "Tesla T4");
        assert_eq!(gpus[1].utilization, "98%");
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_gpu_line("Tesla T4, 0, 3").unwrap_err();
        assert!(matches!(err, CollectError::MalformedLine { .. }));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = parse_gpu_line("Tesla T4, [N/A], 3, 15360").unwrap_err();
        assert!(err.to_string().contains("utilization"));
    }

    #[test]
    fn empty_output_means_no_gpus() {
        assert!(matches!(
            parse_gpu_output("  \n").unwrap_err(),
            CollectError::NoGpus
        ));
    }

    #[test]
    fn program_override_keeps_query_args() {
        let query = GpuQuery::nvidia_smi().with_program("/usr/local/bin/nvidia-smi");
        assert_eq!(query.program(), "/usr/local/bin/nvidia-smi");
        assert_eq!(query.args, NVIDIA_SMI_ARGS);
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let query = GpuQuery::nvidia_smi().with_program("hoststat-test-missing-smi");
        let err = query.run().await.unwrap_err();
        assert!(matches!(err, CollectError::ToolNotFound(p) if p == "hoststat-test-missing-smi"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_tool_failure() {
        let query = GpuQuery::new("sh", ["-c", "echo driver mismatch >&2; exit 9"]);
        match query.run().await.unwrap_err() {
            CollectError::ToolFailed { detail, .. } => assert_eq!(detail, "driver mismatch"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_tool_is_killed_after_timeout() {
        let query =
            GpuQuery::new("sh", ["-c", "exec sleep 30"]).with_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let err = query.run().await.unwrap_err();
        assert!(matches!(
            err,
            CollectError::ToolTimedOut { timeout_ms: 200, .. }
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
