use hoststat_core::Collector;
use std::sync::Arc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// 只读配置；每次请求各自采集，不共享可变状态
    pub collector: Arc<Collector>,
}
