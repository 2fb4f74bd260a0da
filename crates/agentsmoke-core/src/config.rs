//! Configuration management for AgentSmoke

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Telemetry backend configuration
    pub backend: BackendConfig,

    /// Application under test configuration
    pub app: AppConfig,

    /// Cluster provisioning configuration
    pub cluster: ClusterConfig,

    /// Agent injection configuration
    pub agent: AgentConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `BACKEND_URL`, `APP_URL`, `BUILD_TAG`,
    /// `AGENT_LOADER_IMAGE`.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(url) = std::env::var("BACKEND_URL") {
            cfg.backend.base_url = url;
        }
        if let Ok(url) = std::env::var("APP_URL") {
            cfg.app.base_url = url;
        }
        if let Ok(image) = std::env::var("AGENT_LOADER_IMAGE") {
            cfg.agent.loader_image = image;
        }
        match std::env::var("BUILD_TAG") {
            Ok(tag) if !tag.is_empty() => cfg.agent.build_tag = tag,
            _ => {
                return Err(Error::config(
                    "BUILD_TAG environment variable is required",
                ))
            }
        }

        Ok(cfg)
    }
}

/// Telemetry backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the trace-collection backend
    pub base_url: String,

    /// Interval between polls while the backend has no traces
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Per-request timeout for backend calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:32006".to_string(),
            poll_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Application under test configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the instrumented application
    pub base_url: String,

    /// Per-request timeout for application calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:32010".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Cluster provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Prefix for generated test namespaces
    pub namespace_prefix: String,

    /// Ready replicas a deployment must reach before the harness proceeds
    pub ready_replicas: i32,

    /// How long to wait for a deployment to become ready
    #[serde(with = "humantime_serde")]
    pub ready_timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: "agentsmoke".to_string(),
            ready_replicas: 1,
            ready_timeout: Duration::from_secs(300),
        }
    }
}

/// Agent injection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name of the agent loader image
    pub loader_image: String,

    /// Tag of the agent loader image
    pub build_tag: String,

    /// Path where the agent volume is mounted in both containers
    pub mount_path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            loader_image: "javaagent-loader".to_string(),
            build_tag: String::new(),
            mount_path: "/opt/javaagent/".to_string(),
        }
    }
}

impl AgentConfig {
    /// Full `name:tag` reference of the loader image
    pub fn loader_image_ref(&self) -> String {
        format!("{}:{}", self.loader_image, self.build_tag)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Initialize the global tracing subscriber from a logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; subsequent calls are ignored.
pub fn init_logging(cfg: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if cfg.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // Already-set subscriber means another test in the binary won the race.
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_node_ports() {
        let cfg = Config::default();
        assert_eq!(cfg.backend.base_url, "http://localhost:32006");
        assert_eq!(cfg.app.base_url, "http://localhost:32010");
        assert_eq!(cfg.backend.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.cluster.ready_replicas, 1);
    }

    #[test]
    fn loader_image_ref_joins_name_and_tag() {
        let agent = AgentConfig {
            build_tag: "abc123".to_string(),
            ..AgentConfig::default()
        };
        assert_eq!(agent.loader_image_ref(), "javaagent-loader:abc123");
    }

    #[test]
    fn durations_round_trip_through_humantime() {
        let cfg = BackendConfig::default();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: BackendConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.poll_interval, cfg.poll_interval);
    }
}
