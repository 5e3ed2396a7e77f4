//! StatefulSet operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::api::Api;

/// Create or update a StatefulSet
pub async fn apply_statefulset(
    client: &K8sClient,
    namespace: &str,
    statefulset: &StatefulSet,
) -> K8sResult<StatefulSet> {
    let sts: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::apply_resource(&sts, statefulset).await
}

/// Delete a StatefulSet
pub async fn delete_statefulset(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<()> {
    let sts: Api<StatefulSet> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::delete_resource(&sts, name).await
}
