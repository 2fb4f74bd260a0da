//! Client for the trace-collection backend
//!
//! The backend accumulates every OTLP export request the agent sent it and
//! serves them back over `GET /get-traces` as a JSON array of raw export
//! blobs. The poller retries only the empty-result case: a network failure,
//! a non-200 status, or a decode failure aborts the wait immediately.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::config::BackendConfig;
use crate::decode;
use crate::error::{Error, Result};
use crate::models::TraceExport;

/// HTTP client for the trace-collection backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    traces_url: Url,
    poll_interval: Duration,
}

impl BackendClient {
    /// Create a client from a backend configuration
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let traces_url = format!("{}/get-traces", cfg.base_url.trim_end_matches('/'));
        let traces_url = Url::parse(&traces_url)
            .map_err(|e| Error::config(format!("invalid backend URL {:?}: {e}", cfg.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;

        Ok(Self {
            http,
            traces_url,
            poll_interval: cfg.poll_interval,
        })
    }

    /// Fetch and decode every trace export the backend has collected so far.
    ///
    /// A fresh batch is decoded on every call; nothing is cached across
    /// polls. Any non-200 status is a hard failure.
    pub async fn get_traces(&self) -> Result<Vec<TraceExport>> {
        let resp = self.http.get(self.traces_url.clone()).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::Status {
                url: self.traces_url.to_string(),
                status: resp.status(),
            });
        }

        let body = resp.text().await?;
        decode::decode_body(&body)
    }

    /// Poll until the backend reports at least one trace export, or until
    /// `timeout` elapses.
    ///
    /// Empty batches are retried after the configured poll interval. Every
    /// other failure propagates without retry.
    pub async fn wait_for_traces(&self, timeout: Duration) -> Result<Vec<TraceExport>> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(Error::Timeout { waited: timeout });
            }

            let traces = self.get_traces().await?;
            if !traces.is_empty() {
                debug!(exports = traces.len(), "backend returned traces");
                return Ok(traces);
            }

            debug!(
                interval = %humantime::format_duration(self.poll_interval),
                "no traces collected yet, polling again"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_unparseable_base_url() {
        let cfg = BackendConfig {
            base_url: "not a url".to_string(),
            ..BackendConfig::default()
        };
        assert!(matches!(BackendClient::new(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn normalizes_trailing_slashes() {
        let cfg = BackendConfig {
            base_url: "http://localhost:32006/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::new(&cfg).unwrap();
        assert_eq!(
            client.traces_url.as_str(),
            "http://localhost:32006/get-traces"
        );
    }
}
