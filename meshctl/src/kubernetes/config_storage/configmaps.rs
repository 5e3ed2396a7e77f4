//! ConfigMap operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::Api;

/// Create or update a ConfigMap
pub async fn apply_configmap(
    client: &K8sClient,
    namespace: &str,
    configmap: &ConfigMap,
) -> K8sResult<ConfigMap> {
    let configmaps: Api<ConfigMap> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::apply_resource(&configmaps, configmap).await
}

/// Delete a ConfigMap
pub async fn delete_configmap(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<()> {
    let configmaps: Api<ConfigMap> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::delete_resource(&configmaps, name).await
}
