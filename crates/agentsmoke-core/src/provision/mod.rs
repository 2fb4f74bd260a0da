//! Provisioning collaborator seam
//!
//! Cluster orchestration itself is out of scope for this crate; the harness
//! only relies on the contract "apply manifests, wait until ready, tear
//! down". The `Provisioner` trait is that contract, implemented elsewhere
//! (kind, a real cluster, or a test double).

mod manifest;

pub use manifest::{
    inject_agent, Container, Deployment, DeploymentSpec, EnvVar, Manifest, ManifestSet, Metadata,
    PodSpec, PodTemplateSpec, Volume, VolumeMount, AGENT_INIT_CONTAINER, AGENT_VOLUME,
};

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::ClusterConfig;
use crate::error::{Error, Result};

/// Contract the harness requires from a cluster provisioning backend
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create a namespace for one scenario run
    async fn create_namespace(&self, ns: &str) -> Result<()>;

    /// Tear a scenario namespace down, deleting everything in it
    async fn delete_namespace(&self, ns: &str) -> Result<()>;

    /// Apply a set of manifests into a namespace
    async fn apply(&self, manifests: &ManifestSet, ns: &str) -> Result<()>;

    /// Block until `deployment` reports the requested ready-replica count
    async fn wait_ready(
        &self,
        deployment: &str,
        ns: &str,
        ready_replicas: i32,
        timeout: Duration,
    ) -> Result<()>;
}

/// Apply a manifest set and wait for its first deployment to become ready.
pub async fn apply_and_wait<P: Provisioner + ?Sized>(
    provisioner: &P,
    manifests: &ManifestSet,
    ns: &str,
    cluster: &ClusterConfig,
) -> Result<()> {
    let deployment = manifests
        .first_deployment_name()
        .ok_or_else(|| Error::provision("manifest set contains no deployment"))?
        .to_string();

    provisioner.apply(manifests, ns).await?;
    provisioner
        .wait_ready(&deployment, ns, cluster.ready_replicas, cluster.ready_timeout)
        .await
}

/// Generate a unique namespace name for one scenario run.
///
/// The suffix keeps concurrent runs against the same cluster from
/// colliding; the result is a valid DNS-1123 label as long as the prefix is.
pub fn random_namespace(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{prefix}-{suffix:08x}")
}
