//! Kubernetes manifest parsing and mutation
//!
//! Manifests are modeled as a tagged union over the object `kind` rather
//! than runtime type assertions: kinds the harness mutates (Deployment) are
//! typed, everything else rides along opaquely and re-serializes untouched.
//! Unknown fields on typed kinds are preserved through a flattened mapping.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::AgentConfig;
use crate::error::Result;

/// Name of the shared volume the agent is copied into
pub const AGENT_VOLUME: &str = "javaagent";

/// Name of the init container that copies the agent
pub const AGENT_INIT_CONTAINER: &str = "inject-javaagent";

/// A single Kubernetes object, keyed by its `kind` field
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    /// An `apps/v1` Deployment; the only kind the harness mutates
    Deployment(Deployment),
    /// Any other kind, carried opaquely
    Other(Value),
}

impl Manifest {
    fn from_value(value: Value) -> Result<Self> {
        match value.get("kind").and_then(Value::as_str) {
            Some("Deployment") => Ok(Self::Deployment(serde_yaml::from_value(value)?)),
            _ => Ok(Self::Other(value)),
        }
    }

    /// The object's `kind`, if present
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Deployment(_) => Some("Deployment"),
            Self::Other(value) => value.get("kind").and_then(Value::as_str),
        }
    }

    /// The object's `metadata.name`, if present
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Deployment(dep) => Some(dep.metadata.name.as_str()),
            Self::Other(value) => value
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(Value::as_str),
        }
    }

    fn set_namespace(&mut self, ns: &str) {
        match self {
            Self::Deployment(dep) => dep.metadata.namespace = Some(ns.to_string()),
            Self::Other(value) => {
                let root = match value {
                    Value::Mapping(m) => m,
                    _ => return,
                };
                let key = Value::from("metadata");
                if !matches!(root.get(&key), Some(Value::Mapping(_))) {
                    root.insert(key.clone(), Value::Mapping(Mapping::new()));
                }
                if let Some(Value::Mapping(metadata)) = root.get_mut(&key) {
                    metadata.insert(Value::from("namespace"), Value::from(ns));
                }
            }
        }
    }

    fn to_value(&self) -> Result<Value> {
        let value = match self {
            Self::Deployment(dep) => serde_yaml::to_value(dep)?,
            Self::Other(value) => value.clone(),
        };
        Ok(value)
    }
}

/// An ordered set of Kubernetes objects parsed from one manifest file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestSet {
    objects: Vec<Manifest>,
}

impl ManifestSet {
    /// Parse a (possibly multi-document) YAML manifest.
    pub fn from_yaml(input: &str) -> Result<Self> {
        let mut objects = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(input) {
            let value = Value::deserialize(doc)?;
            if value.is_null() {
                // Blank documents between separators are legal.
                continue;
            }
            objects.push(Manifest::from_value(value)?);
        }
        Ok(Self { objects })
    }

    /// The parsed objects, in document order
    pub fn objects(&self) -> &[Manifest] {
        &self.objects
    }

    /// Whether the set holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Set `metadata.namespace` on every object in the set.
    pub fn set_namespace(&mut self, ns: &str) {
        for object in &mut self.objects {
            object.set_namespace(ns);
        }
    }

    /// Run a mutation hook over every Deployment in the set.
    pub fn for_each_deployment(&mut self, mut f: impl FnMut(&mut Deployment)) {
        for object in &mut self.objects {
            if let Manifest::Deployment(dep) = object {
                f(dep);
            }
        }
    }

    /// Name of the first Deployment in the set, the one whose readiness
    /// gates the scenario.
    pub fn first_deployment_name(&self) -> Option<&str> {
        self.objects.iter().find_map(|object| match object {
            Manifest::Deployment(dep) => Some(dep.metadata.name.as_str()),
            Manifest::Other(_) => None,
        })
    }

    /// Serialize the set back to multi-document YAML.
    pub fn to_yaml(&self) -> Result<String> {
        let mut out = String::new();
        for object in &self.objects {
            if !out.is_empty() {
                out.push_str("---\n");
            }
            out.push_str(&serde_yaml::to_string(&object.to_value()?)?);
        }
        Ok(out)
    }
}

/// Object metadata; fields the harness does not touch are preserved
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Object name
    #[serde(default)]
    pub name: String,

    /// Object namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Everything else (labels, annotations, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

/// An `apps/v1` Deployment, typed down to the fields the harness mutates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deployment {
    /// Object metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Deployment spec
    #[serde(default)]
    pub spec: DeploymentSpec,

    /// apiVersion, kind and anything else
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Deployment {
    /// The application container: by convention the first one in the pod.
    pub fn app_container_mut(&mut self) -> Option<&mut Container> {
        self.spec.template.spec.containers.first_mut()
    }
}

/// Deployment spec subset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Pod template
    #[serde(default)]
    pub template: PodTemplateSpec,

    /// replicas, selector and anything else
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Pod template subset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    /// Pod spec
    #[serde(default)]
    pub spec: PodSpec,

    /// Template metadata and anything else
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Pod spec subset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Application containers
    #[serde(default)]
    pub containers: Vec<Container>,

    /// Init containers, run to completion before the app starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,

    /// Pod volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    /// Everything else
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Container subset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    #[serde(default)]
    pub name: String,

    /// Container image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image pull policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,

    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    /// Everything else (ports, probes, resources, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Container {
    /// Merge environment variables over the manifest's own.
    ///
    /// Manifest order is kept; a variable in `overrides` replaces the
    /// manifest value of the same name, and new variables are appended in
    /// the order given. Deterministic, unlike the map-driven merge this
    /// replaces.
    pub fn merge_env(&mut self, overrides: &[EnvVar]) {
        for var in overrides {
            match self.env.iter_mut().find(|existing| existing.name == var.name) {
                Some(existing) => existing.value = var.value.clone(),
                None => self.env.push(var.clone()),
            }
        }
    }
}

/// Environment variable
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name
    pub name: String,

    /// Literal value; valueFrom variants ride in `extra`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Everything else
    #[serde(flatten)]
    pub extra: Mapping,
}

impl EnvVar {
    /// Convenience constructor for a literal-valued variable
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            extra: Mapping::new(),
        }
    }
}

/// Volume mount
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name
    pub name: String,

    /// Mount path inside the container
    pub mount_path: String,

    /// Whether the mount is read-only
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

/// Pod volume
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,

    /// emptyDir volume source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<Mapping>,

    /// Any other volume source
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Wire a deployment up for agent injection.
///
/// Mounts a shared `emptyDir` volume into the application container,
/// read-only, and prepends an init container that copies the agent from the
/// loader image into that volume before the application starts.
pub fn inject_agent(dep: &mut Deployment, agent: &AgentConfig) {
    let pod = &mut dep.spec.template.spec;

    if let Some(container) = pod.containers.first_mut() {
        container.volume_mounts.push(VolumeMount {
            name: AGENT_VOLUME.to_string(),
            mount_path: agent.mount_path.clone(),
            read_only: true,
        });
    }

    pod.volumes.push(Volume {
        name: AGENT_VOLUME.to_string(),
        empty_dir: Some(Mapping::new()),
        extra: Mapping::new(),
    });

    pod.init_containers.insert(
        0,
        Container {
            name: AGENT_INIT_CONTAINER.to_string(),
            image: Some(agent.loader_image_ref()),
            image_pull_policy: Some("IfNotPresent".to_string()),
            volume_mounts: vec![VolumeMount {
                name: AGENT_VOLUME.to_string(),
                mount_path: agent.mount_path.clone(),
                read_only: false,
            }],
            ..Container::default()
        },
    );
}
