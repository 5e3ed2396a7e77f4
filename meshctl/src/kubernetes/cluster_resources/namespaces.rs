//! Namespace operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::Api;

/// Create or update a namespace
pub async fn apply_namespace(client: &K8sClient, namespace: &Namespace) -> K8sResult<Namespace> {
    let namespaces: Api<Namespace> = Api::all(client.inner().clone());
    crate::kubernetes::apply_resource(&namespaces, namespace).await
}
