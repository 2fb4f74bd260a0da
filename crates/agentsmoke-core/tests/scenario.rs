//! Full smoke flow against mock HTTP endpoints and a fake provisioner

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agentsmoke::config::Config;
use agentsmoke::provision::{ManifestSet, Provisioner};
use agentsmoke::query;
use agentsmoke::scenario::SmokeScenario;
use agentsmoke::{Error, Result};

const BACKEND_MANIFEST: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: otel-backend
spec:
  template:
    spec:
      containers:
        - name: backend
          image: otel-backend:latest
"#;

const APP_MANIFEST: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: springboot
spec:
  type: NodePort
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: springboot
spec:
  template:
    spec:
      containers:
        - name: springboot
          image: placeholder:latest
"#;

const EXPORT: &str = r#"{
    "resourceSpans": [{
        "resource": {
            "attributes": [
                {"key": "lumigo.distro.version", "value": {"stringValue": "dev"}}
            ]
        },
        "scopeSpans": [{
            "spans": [{"name": "GET /greeting"}]
        }]
    }]
}"#;

/// Records every provisioning call; applied manifests are kept as YAML.
#[derive(Default)]
struct FakeProvisioner {
    calls: Mutex<Vec<String>>,
    applied: Mutex<Vec<String>>,
}

impl FakeProvisioner {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn create_namespace(&self, ns: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("create {ns}"));
        Ok(())
    }

    async fn delete_namespace(&self, ns: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("delete {ns}"));
        Ok(())
    }

    async fn apply(&self, manifests: &ManifestSet, ns: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!(
            "apply {} {ns}",
            manifests.first_deployment_name().unwrap_or("?")
        ));
        self.applied.lock().unwrap().push(manifests.to_yaml().unwrap());
        Ok(())
    }

    async fn wait_ready(
        &self,
        deployment: &str,
        ns: &str,
        ready_replicas: i32,
        _timeout: Duration,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("ready {deployment} {ns} {ready_replicas}"));
        Ok(())
    }
}

async fn serving_backend(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-traces"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;
    server
}

async fn serving_app() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/greeting"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hi!"))
        .mount(&server)
        .await;
    server
}

fn config_for(backend: &MockServer, app: &MockServer) -> Config {
    let mut config = Config::default();
    config.backend.base_url = backend.uri();
    config.app.base_url = app.uri();
    config.agent.build_tag = "t1".to_string();
    config
}

#[tokio::test]
async fn runs_the_full_flow_in_order() {
    let backend = serving_backend(format!("[{EXPORT}]")).await;
    let app = serving_app().await;
    let provisioner = FakeProvisioner::default();

    let traces = SmokeScenario::new(config_for(&backend, &app), BACKEND_MANIFEST, APP_MANIFEST)
        .with_app_image("springboot:jdk8")
        .with_trace_timeout(Duration::from_secs(5))
        .run(&provisioner)
        .await
        .unwrap();

    assert_eq!(query::count_spans_by_name(&traces, "GET /greeting"), 1);
    assert_eq!(
        query::count_by_attribute_key_value(&traces, "lumigo.distro.version", "dev"),
        1
    );

    let calls = provisioner.calls();
    assert_eq!(calls.len(), 6, "calls: {calls:?}");
    let ns = calls[0].strip_prefix("create ").unwrap().to_string();
    assert_eq!(calls[1], format!("apply otel-backend {ns}"));
    assert_eq!(calls[2], format!("ready otel-backend {ns} 1"));
    assert_eq!(calls[3], format!("apply springboot {ns}"));
    assert_eq!(calls[4], format!("ready springboot {ns} 1"));
    assert_eq!(calls[5], format!("delete {ns}"));
}

#[tokio::test]
async fn injects_the_agent_into_the_applied_app_manifest() {
    let backend = serving_backend(format!("[{EXPORT}]")).await;
    let app = serving_app().await;
    let provisioner = FakeProvisioner::default();

    SmokeScenario::new(config_for(&backend, &app), BACKEND_MANIFEST, APP_MANIFEST)
        .with_app_image("springboot:jdk11")
        .run(&provisioner)
        .await
        .unwrap();

    let applied = provisioner.applied();
    assert_eq!(applied.len(), 2);

    // Backend manifest goes through untouched apart from the namespace.
    assert!(!applied[0].contains("inject-javaagent"));

    let app_yaml = &applied[1];
    assert!(app_yaml.contains("springboot:jdk11"));
    assert!(app_yaml.contains("inject-javaagent"));
    assert!(app_yaml.contains("javaagent-loader:t1"));
    assert!(app_yaml.contains("emptyDir"));
}

#[tokio::test]
async fn tears_the_namespace_down_when_the_wait_fails() {
    // Backend that never has traces; short timeout forces a failure.
    let backend = serving_backend("[]".to_string()).await;
    let app = serving_app().await;
    let provisioner = FakeProvisioner::default();

    let err = SmokeScenario::new(config_for(&backend, &app), BACKEND_MANIFEST, APP_MANIFEST)
        .with_trace_timeout(Duration::from_millis(600))
        .run(&provisioner)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got {err}");
    let calls = provisioner.calls();
    assert!(
        calls.last().unwrap().starts_with("delete "),
        "namespace must be deleted on failure: {calls:?}"
    );
}

#[tokio::test]
async fn wrong_greeting_body_aborts_the_scenario() {
    let backend = serving_backend(format!("[{EXPORT}]")).await;
    let app = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/greeting"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello!"))
        .mount(&app)
        .await;
    let provisioner = FakeProvisioner::default();

    let err = SmokeScenario::new(config_for(&backend, &app), BACKEND_MANIFEST, APP_MANIFEST)
        .run(&provisioner)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Greeting(_)), "got {err}");
    // The backend was never polled: the greeting gates trace collection.
    assert!(backend.received_requests().await.unwrap().is_empty());
}
