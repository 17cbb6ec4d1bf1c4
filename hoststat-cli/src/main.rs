mod client;
mod ops;

use clap::Parser;
use client::{build_client, DEFAULT_STATS_URL, DEFAULT_TIMEOUT};
use ops::{watch, GpuGroup, GpuLayout, OutputFormat, Poller, WatchOptions, DEFAULT_INTERVAL};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Live terminal view of a hoststat collector.
#[derive(Parser)]
#[command(
    name = "hoststat-cli",
    author,
    version,
    about = "Live CPU/RAM/GPU table polled from a hoststat collector"
)]
struct Cli {
    /// Collector endpoint
    #[arg(long, env = "HS_STATS_URL", default_value = DEFAULT_STATS_URL)]
    url: String,

    /// Pause between polls, in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL.as_millis() as u64)]
    interval_ms: u64,

    /// Request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// 将多块 GPU 合并为一行：NAME=IDX,IDX,...（例如 rig=0,1,2,3）
    #[arg(long, value_parser = parse_group)]
    group: Option<GpuGroup>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

fn parse_group(s: &str) -> Result<GpuGroup, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件（如果存在），忽略错误
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let client = build_client(Duration::from_secs(cli.timeout_secs))?;
    let layout = cli.group.map(GpuLayout::Grouped).unwrap_or_default();
    let mut poller = Poller::new(
        client,
        WatchOptions {
            url: cli.url,
            interval: Duration::from_millis(cli.interval_ms),
            layout,
        },
    );

    watch(&mut poller, cli.output).await
}

/// Logs go to stderr so they never interleave with the table on stdout.
fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
