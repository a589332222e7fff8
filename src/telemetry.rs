//! Usage telemetry: one best-effort HTTP GET per newly seen body.
//!
//! Requests run as detached tasks on the binary's tokio runtime. Failures are
//! logged and dropped, nothing is retried.

use anyhow::{bail, Context, Result};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use url::Url;

use crate::body::BodyId;
use crate::config::TelemetryConfig;

/// ログに残す応答本文の最大文字数
const MAX_LOGGED_BODY: usize = 200;

/// http / https の URL だけを受け付ける
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).with_context(|| format!("invalid endpoint {:?}", endpoint))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme {:?} (http or https)", url.scheme());
    }
    if url.host_str().is_none() {
        bail!("endpoint {:?} has no host", endpoint);
    }
    Ok(url)
}

/// 前後の空白を落とし、長ければ末尾を省略する
fn truncate_body(body: &str, max_chars: usize) -> String {
    let body = body.trim();
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// 送信中のリクエストを打ち切って待つためのハンドル
///
/// `Telemetry` 本体を手放した後 (bevy の World ごと破棄された後など) でも使える
#[derive(Debug, Clone)]
pub struct TelemetryShutdown {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl TelemetryShutdown {
    /// 送信中のリクエスト数
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// 送信中のリクエストを打ち切り、最大 `wait` だけ終了を待つ
    pub async fn wait(&self, wait: Duration) {
        self.token.cancel();
        self.tracker.close();
        if tokio::time::timeout(wait, self.tracker.wait()).await.is_err() {
            warn!("Telemetry: {} request(s) still running at shutdown", self.tracker.len());
        }
    }
}

pub struct Telemetry {
    target: Option<(Url, reqwest::Client)>,
    handle: Handle,
    shutdown: TelemetryShutdown,
}

impl Telemetry {
    /// `endpoint` が未設定、または不正なら何も送らない
    pub fn new(config: &TelemetryConfig, handle: Handle, shutdown: &CancellationToken) -> Self {
        let target = match config.endpoint.as_deref() {
            None => None,
            Some(raw) => match Self::connect(raw, Duration::from_millis(config.timeout_ms), &handle) {
                Ok((url, client)) => {
                    info!("Telemetry enabled: {}", url.host_str().unwrap_or_default());
                    Some((url, client))
                }
                Err(e) => {
                    warn!("Telemetry disabled: {:#}", e);
                    None
                }
            },
        };

        Self {
            target,
            handle,
            shutdown: TelemetryShutdown {
                token: shutdown.child_token(),
                tracker: TaskTracker::new(),
            },
        }
    }

    fn connect(raw: &str, timeout: Duration, handle: &Handle) -> Result<(Url, reqwest::Client)> {
        let url = parse_endpoint(raw)?;
        let _guard = handle.enter();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skeleton_mapper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("HTTP client init failed")?;
        Ok((url, client))
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// 送信中のリクエスト数
    pub fn in_flight(&self) -> usize {
        self.shutdown.in_flight()
    }

    pub fn shutdown_handle(&self) -> TelemetryShutdown {
        self.shutdown.clone()
    }

    /// 新しい人物の検出を通知 (ブロックしない)
    pub fn report_new_body(&self, body: BodyId) {
        let Some((endpoint, client)) = self.target.clone() else {
            return;
        };
        let token = self.shutdown.token.clone();
        if token.is_cancelled() {
            return;
        }

        self.shutdown.tracker.spawn_on(
            async move {
                tokio::select! {
                    _ = token.cancelled() => debug!("telemetry for {} cancelled", body),
                    result = get(&client, endpoint) => match result {
                        Ok(response) => info!("Telemetry for {}: {}", body, response),
                        Err(e) => warn!("Telemetry for {} failed: {:#}", body, e),
                    },
                }
            },
            &self.handle,
        );
    }

    /// 送信中のリクエストを打ち切り、最大 `wait` だけ終了を待つ
    pub async fn shutdown(&self, wait: Duration) {
        self.shutdown.wait(wait).await
    }
}

impl Drop for Telemetry {
    fn drop(&mut self) {
        self.shutdown.token.cancel();
    }
}

/// ステータスと応答本文 (省略済み) を返す。2xx 以外はエラー
async fn get(client: &reqwest::Client, endpoint: Url) -> Result<String> {
    let response = client
        .get(endpoint)
        .send()
        .await
        .context("request failed")?;
    let status = response.status();
    let body = response.text().await.context("failed to read response body")?;
    let body = truncate_body(&body, MAX_LOGGED_BODY);
    if !status.is_success() {
        bail!("server answered {}: {}", status, body);
    }
    Ok(format!("{} {}", status, body).trim_end().to_string())
}
