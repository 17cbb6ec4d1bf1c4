mod display;
mod load;
mod output;
mod table;
pub mod ui;
mod watch;

pub use output::OutputFormat;
pub use table::{GpuGroup, GpuLayout};
pub use watch::{watch, Poller, WatchOptions, DEFAULT_INTERVAL};
