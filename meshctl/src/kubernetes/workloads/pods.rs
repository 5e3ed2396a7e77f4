//! Pod operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use serde::Serialize;

/// Simplified Pod information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodInfo {
    pub name: String,
    pub phase: String,
    /// Ready containers over total, e.g. `1/1`
    pub ready: String,
    pub restarts: i32,
    pub node: Option<String>,
}

/// List Pods in a namespace matching a label selector
pub async fn list_pods(
    client: &K8sClient,
    namespace: &str,
    selector: &str,
) -> K8sResult<Vec<PodInfo>> {
    let pods: Api<Pod> = Api::namespaced(client.inner().clone(), namespace);
    let list = pods.list(&ListParams::default().labels(selector)).await?;

    Ok(list.items.into_iter().map(pod_to_info).collect())
}

fn pod_to_info(pod: Pod) -> PodInfo {
    let spec = pod.spec.unwrap_or_default();
    let status = pod.status.unwrap_or_default();
    let container_statuses = status.container_statuses.unwrap_or_default();

    let ready = container_statuses.iter().filter(|c| c.ready).count();
    let restarts = container_statuses.iter().map(|c| c.restart_count).sum();

    PodInfo {
        name: pod.metadata.name.unwrap_or_default(),
        phase: status.phase.unwrap_or_else(|| "Unknown".to_string()),
        ready: format!("{}/{}", ready, spec.containers.len()),
        restarts,
        node: spec.node_name,
    }
}
