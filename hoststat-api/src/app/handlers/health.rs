use axum::extract::ConnectInfo;
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde_json::json;
use std::net::SocketAddr;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 处理 404，记录请求路径与来源
pub async fn handler_404(
    uri: Uri,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into());
    tracing::warn!("404: path={}, IP={}", uri.path(), ip);

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NOT_FOUND",
            "message": "only /system_stats and /health are served"
        })),
    )
}
