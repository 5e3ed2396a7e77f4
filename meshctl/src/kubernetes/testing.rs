//! Helpers for tests that talk to a mocked API server

use super::K8sClient;
use serde_json::{json, Value};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Client pointed at a wiremock API server
pub(crate) fn client_for(server: &MockServer) -> K8sClient {
    let config = kube::Config::new(server.uri().parse().unwrap());
    K8sClient::from_config(config).unwrap()
}

/// `metav1.Status` body the API server sends with a failure
pub(crate) fn status_body(code: u16, reason: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("{reason} in test"),
        "reason": reason,
        "code": code,
    })
}

pub(crate) fn failure(code: u16, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(status_body(code, reason))
}

/// Answers a create by returning the posted object
pub(crate) struct EchoCreated;

impl Respond for EchoCreated {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(201).set_body_raw(request.body.clone(), "application/json")
    }
}

/// `METHOD path` of every request the server saw, in arrival order
pub(crate) async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
