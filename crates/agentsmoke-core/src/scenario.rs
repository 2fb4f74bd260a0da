//! End-to-end smoke scenario
//!
//! One scenario run: provision a fresh namespace, deploy the collection
//! backend, deploy the instrumented application with the agent injected,
//! drive one greeting request, then poll the backend until traces arrive.
//! The namespace is torn down whether or not the run succeeded.

use std::time::Duration;

use tracing::{info, warn};

use crate::app::AppClient;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::TraceExport;
use crate::provision::{
    apply_and_wait, inject_agent, random_namespace, EnvVar, ManifestSet, Provisioner,
};

/// Default time to wait for the first non-empty trace batch
const DEFAULT_TRACE_TIMEOUT: Duration = Duration::from_secs(30);

/// A configured smoke scenario, generic over the provisioning backend
#[derive(Debug, Clone)]
pub struct SmokeScenario {
    config: Config,
    backend_manifest: String,
    app_manifest: String,
    app_image: Option<String>,
    extra_env: Vec<EnvVar>,
    trace_timeout: Duration,
}

impl SmokeScenario {
    /// Create a scenario from a configuration and the two manifest files.
    pub fn new(
        config: Config,
        backend_manifest: impl Into<String>,
        app_manifest: impl Into<String>,
    ) -> Self {
        Self {
            config,
            backend_manifest: backend_manifest.into(),
            app_manifest: app_manifest.into(),
            app_image: None,
            extra_env: Vec::new(),
            trace_timeout: DEFAULT_TRACE_TIMEOUT,
        }
    }

    /// Override the application container image (e.g. to pick a JDK).
    pub fn with_app_image(mut self, image: impl Into<String>) -> Self {
        self.app_image = Some(image.into());
        self
    }

    /// Add an environment variable override for the application container.
    pub fn with_env(mut self, var: EnvVar) -> Self {
        self.extra_env.push(var);
        self
    }

    /// Override how long to wait for traces.
    pub fn with_trace_timeout(mut self, timeout: Duration) -> Self {
        self.trace_timeout = timeout;
        self
    }

    /// Run the scenario end to end and return the collected trace batch.
    pub async fn run<P: Provisioner + ?Sized>(&self, provisioner: &P) -> Result<Vec<TraceExport>> {
        let ns = random_namespace(&self.config.cluster.namespace_prefix);
        info!(namespace = %ns, "starting smoke scenario");

        provisioner.create_namespace(&ns).await?;
        let outcome = self.run_in_namespace(provisioner, &ns).await;
        let teardown = provisioner.delete_namespace(&ns).await;

        match (outcome, teardown) {
            (Ok(traces), Ok(())) => {
                info!(namespace = %ns, exports = traces.len(), "smoke scenario finished");
                Ok(traces)
            }
            (Ok(_), Err(teardown_err)) => Err(teardown_err),
            (Err(run_err), Ok(())) => Err(run_err),
            (Err(run_err), Err(teardown_err)) => {
                // The run failure is the interesting one; the teardown
                // failure only gets logged.
                warn!(namespace = %ns, error = %teardown_err, "namespace teardown failed");
                Err(run_err)
            }
        }
    }

    async fn run_in_namespace<P: Provisioner + ?Sized>(
        &self,
        provisioner: &P,
        ns: &str,
    ) -> Result<Vec<TraceExport>> {
        // Backend goes first so no export from the app is ever missed.
        let mut backend = ManifestSet::from_yaml(&self.backend_manifest)?;
        backend.set_namespace(ns);
        apply_and_wait(provisioner, &backend, ns, &self.config.cluster).await?;
        info!(namespace = %ns, "collection backend ready");

        let mut app = ManifestSet::from_yaml(&self.app_manifest)?;
        app.set_namespace(ns);
        app.for_each_deployment(|dep| {
            if let Some(container) = dep.app_container_mut() {
                if let Some(image) = &self.app_image {
                    container.image = Some(image.clone());
                }
                container.merge_env(&self.extra_env);
            }
            inject_agent(dep, &self.config.agent);
        });
        apply_and_wait(provisioner, &app, ns, &self.config.cluster).await?;
        info!(namespace = %ns, "instrumented application ready");

        AppClient::new(&self.config.app)?.greet().await?;

        BackendClient::new(&self.config.backend)?
            .wait_for_traces(self.trace_timeout)
            .await
    }
}
