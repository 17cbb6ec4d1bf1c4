mod health;
mod stats;

pub use health::{handler_404, health};
pub use stats::system_stats;
