//! PersistentVolume operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::core::v1::PersistentVolume;
use kube::api::{Api, ListParams};

/// List all PersistentVolumes
pub async fn list_persistent_volumes(client: &K8sClient) -> K8sResult<Vec<PersistentVolume>> {
    let pvs: Api<PersistentVolume> = Api::all(client.inner().clone());
    let list = pvs.list(&ListParams::default()).await?;

    Ok(list.items)
}
