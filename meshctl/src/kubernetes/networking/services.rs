//! Service operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::{K8sError, K8sResult};
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;

/// Get a specific Service
pub async fn get_service(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<Service> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);

    services
        .get_opt(name)
        .await?
        .ok_or_else(|| K8sError::ResourceNotFound {
            kind: "Service".to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
        })
}

/// Create or update a Service
pub async fn apply_service(
    client: &K8sClient,
    namespace: &str,
    service: &Service,
) -> K8sResult<Service> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::apply_resource(&services, service).await
}

/// Delete a Service
pub async fn delete_service(client: &K8sClient, namespace: &str, name: &str) -> K8sResult<()> {
    let services: Api<Service> = Api::namespaced(client.inner().clone(), namespace);
    crate::kubernetes::delete_resource(&services, name).await
}
