//! 主机资源快照 API

use axum::extract::State;
use axum::Json;
use hoststat_core::SystemSnapshot;
use tracing::instrument;

use crate::app::AppState;

/// 采集一次快照。失败也返回 200，错误放在 body 的 `error` 字段里
#[instrument(skip_all)]
pub async fn system_stats(State(state): State<AppState>) -> Json<SystemSnapshot> {
    Json(state.collector.snapshot().await)
}
