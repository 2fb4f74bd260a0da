//! Traffic generation against the application under test
//!
//! A trace only shows up at the backend after the instrumented app has
//! served a request, so every scenario starts by greeting the app.

use reqwest::StatusCode;
use tracing::info;
use url::Url;

use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Exact body the sample application returns on `GET /greeting`
pub const GREETING_BODY: &str = "Hi!";

/// HTTP client for the instrumented application
#[derive(Debug, Clone)]
pub struct AppClient {
    http: reqwest::Client,
    greeting_url: Url,
}

impl AppClient {
    /// Create a client from an application configuration
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let greeting_url = format!("{}/greeting", cfg.base_url.trim_end_matches('/'));
        let greeting_url = Url::parse(&greeting_url)
            .map_err(|e| Error::config(format!("invalid app URL {:?}: {e}", cfg.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;

        Ok(Self { http, greeting_url })
    }

    /// Call `GET /greeting` and require a 200 with body exactly `"Hi!"`.
    pub async fn greet(&self) -> Result<()> {
        let resp = self.http.get(self.greeting_url.clone()).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::Status {
                url: self.greeting_url.to_string(),
                status: resp.status(),
            });
        }

        let body = resp.text().await?;
        if body != GREETING_BODY {
            return Err(Error::Greeting(body));
        }

        info!("application greeted successfully");
        Ok(())
    }
}
