use hoststat_core::SystemSnapshot;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_STATS_URL: &str = "http://127.0.0.1:8881/system_stats";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build an HTTP client whose requests are all bounded by `timeout`.
pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hoststat-cli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Normalize non-2xx responses into errors while returning the response on success.
pub async fn handle_error(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        Err(anyhow::anyhow!("request failed {}", status))
    } else {
        Err(anyhow::anyhow!("request failed {}: {}", status, body))
    }
}

/// One GET against the collector. Never fails: refused connections, timeouts, non-2xx
/// statuses and undecodable bodies all come back as an error snapshot.
pub async fn fetch_snapshot(client: &reqwest::Client, url: &str) -> SystemSnapshot {
    match try_fetch(client, url).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!(error = %e, "fetch failed");
            SystemSnapshot::error(format!("{e:#}"))
        }
    }
}

async fn try_fetch(client: &reqwest::Client, url: &str) -> anyhow::Result<SystemSnapshot> {
    let resp = client.get(url).send().await?;
    let resp = handle_error(resp).await?;
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| anyhow::anyhow!("malformed response: {e}"))
}
