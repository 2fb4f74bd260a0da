//! # AgentSmoke
//!
//! End-to-end smoke test harness for Kubernetes-deployed applications
//! instrumented with an injected OpenTelemetry agent.
//!
//! A run provisions a namespace, deploys a trace-collection backend and an
//! instrumented application, drives traffic, and asserts over the telemetry
//! the agent exported.
//!
//! ## Architecture
//!
//! - **Models**: decoded OTLP trace exports (protojson mapping)
//! - **Decode**: all-or-nothing batch decoding of raw export blobs
//! - **Backend**: HTTP polling against the collection backend
//! - **Query**: count-based queries over spans and attributes
//! - **Provision**: manifest mutation plus the cluster-provisioning seam
//! - **Scenario**: the deploy → greet → wait-for-traces flow
//!
//! ## Quick start
//!
//! ```no_run
//! use agentsmoke::backend::BackendClient;
//! use agentsmoke::config::Config;
//! use agentsmoke::query;
//! use std::time::Duration;
//!
//! # async fn demo() -> agentsmoke::Result<()> {
//! let config = Config::from_env()?;
//! let backend = BackendClient::new(&config.backend)?;
//! let traces = backend.wait_for_traces(Duration::from_secs(30)).await?;
//! assert!(query::count_spans_by_name(&traces, "GET /greeting") > 0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod backend;
pub mod config;
pub mod decode;
pub mod error;
pub mod models;
pub mod provision;
pub mod query;
pub mod scenario;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::app::AppClient;
    pub use crate::backend::BackendClient;
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::provision::{ManifestSet, Provisioner};
    pub use crate::query::{
        count_by_attribute_key, count_by_attribute_key_value, count_spans_by_name,
    };
    pub use crate::scenario::SmokeScenario;
}
