//! The poll loop: fetch → render → display → sleep, until Ctrl+C.

use super::display::Display;
use super::output::OutputFormat;
use super::table::{render_table, GpuLayout};
use super::ui::{format_footer, print_info};
use crate::client::fetch_snapshot;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub url: String,
    pub interval: Duration,
    pub layout: GpuLayout,
}

pub struct Poller {
    client: reqwest::Client,
    options: WatchOptions,
    state: PollerState,
}

impl Poller {
    pub fn new(client: reqwest::Client, options: WatchOptions) -> Self {
        Self {
            client,
            options,
            state: PollerState::Running,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    async fn poll_once(&self, display: &mut Display) -> anyhow::Result<()> {
        let snapshot = fetch_snapshot(&self.client, &self.options.url).await;
        let table = render_table(&snapshot, &self.options.layout);
        let footer = format_footer(chrono::Local::now(), &self.options.url);
        display.update(&snapshot, &table, &footer)
    }

    /// 一次轮询结束后才开始计时，慢请求只会推迟下一次
    async fn poll_forever(&self, display: &mut Display) -> anyhow::Result<()> {
        loop {
            self.poll_once(display).await?;
            tokio::time::sleep(self.options.interval).await;
        }
    }

    /// Loop until Ctrl+C (`Ok`) or a terminal write fails (`Err`). Always ends `Stopped`.
    pub async fn run(&mut self, display: &mut Display) -> anyhow::Result<()> {
        self.run_until(display, async {
            tokio::signal::ctrl_c().await?;
            info!("interrupt received");
            Ok(())
        })
        .await
    }

    /// Loop until `shutdown` resolves or a display write fails.
    pub async fn run_until<F>(&mut self, display: &mut Display, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let result = tokio::select! {
            res = self.poll_forever(display) => res,
            res = shutdown => res,
        };
        self.state = PollerState::Stopped;
        result
    }
}

/// Set up the display, run the poller, and restore the terminal before saying goodbye.
pub async fn watch(poller: &mut Poller, output: OutputFormat) -> anyhow::Result<()> {
    let display = Display::new(output)?;
    let mut display = scopeguard::guard(display, |mut display| {
        if let Err(e) = display.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
    });

    let result = poller.run(&mut display).await;
    drop(display);
    debug!(state = ?poller.state(), "poller finished");
    result?;

    println!();
    print_info("Exiting gracefully. Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{build_client, DEFAULT_TIMEOUT};

    /// A poller aimed at a port nothing listens on, so every fetch is refused.
    fn refused_poller(interval: Duration) -> Poller {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        Poller::new(
            build_client(DEFAULT_TIMEOUT).unwrap(),
            WatchOptions {
                url: format!("http://{addr}/system_stats"),
                interval,
                layout: GpuLayout::PerDevice,
            },
        )
    }

    #[test]
    fn poller_starts_running() {
        let poller = refused_poller(DEFAULT_INTERVAL);
        assert_eq!(poller.state(), PollerState::Running);
    }

    #[tokio::test]
    async fn fetch_errors_do_not_end_the_loop() {
        let mut poller = refused_poller(Duration::from_millis(50));
        let mut display = Display::new(OutputFormat::Json).unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_millis(600),
            poller.run_until(&mut display, std::future::pending()),
        )
        .await;

        assert!(outcome.is_err(), "loop exited: {outcome:?}");
        assert_eq!(poller.state(), PollerState::Running);
    }

    #[tokio::test]
    async fn shutdown_stops_the_poller() {
        let mut poller = refused_poller(Duration::from_millis(50));
        let mut display = Display::new(OutputFormat::Json).unwrap();

        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        };
        poller.run_until(&mut display, shutdown).await.unwrap();

        assert_eq!(poller.state(), PollerState::Stopped);
    }
}
