mod app;

use app::{app_router, AppState};
use dotenvy::dotenv;
use hoststat_core::{Collector, GpuQuery, DEFAULT_CPU_SAMPLE, DEFAULT_GPU_QUERY_PROGRAM};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ApiConfig {
    bind: SocketAddr,
    /// GPU 查询程序（默认 nvidia-smi，可指定绝对路径）
    gpu_query_program: String,
    /// CPU 使用率采样窗口
    cpu_sample: Duration,
}

impl ApiConfig {
    fn from_env() -> Self {
        let bind = parse_bind(env::var("HS_BIND").ok().as_deref());

        let gpu_query_program = env::var("HS_GPU_QUERY_CMD")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GPU_QUERY_PROGRAM.into());

        let cpu_sample = env::var("HS_CPU_SAMPLE_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CPU_SAMPLE);

        Self {
            bind,
            gpu_query_program,
            cpu_sample,
        }
    }
}

const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8881);

/// 无法解析的 HS_BIND 回退到默认地址，并打印警告
fn parse_bind(raw: Option<&str>) -> SocketAddr {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_BIND;
    };
    match raw.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(value = %raw, error = %e, "invalid HS_BIND, falling back to {DEFAULT_BIND}");
            DEFAULT_BIND
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 优先读取 .env（若存在）
    let _ = dotenv();
    init_tracing();

    let config = ApiConfig::from_env();
    info!(
        gpu_query = %config.gpu_query_program,
        cpu_sample_ms = config.cpu_sample.as_millis() as u64,
        "starting collector on {}",
        config.bind
    );

    let collector = Collector::with_cpu_sample(
        GpuQuery::nvidia_smi().with_program(config.gpu_query_program.clone()),
        config.cpu_sample,
    );
    let state = AppState {
        collector: Arc::new(collector),
    };

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("collector stopped");
    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Ctrl+C 触发优雅退出：停止接受连接，等待进行中的请求完成
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("interrupt received, shutting down");
}
