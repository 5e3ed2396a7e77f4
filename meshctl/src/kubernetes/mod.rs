//! Kubernetes integration
//!
//! Thin helpers over kube-rs used by the install stages:
//! - Client construction from kubeconfig or the environment
//! - Idempotent apply (create, falling back to merge patch) and tolerant delete
//! - Namespaces, ConfigMaps, Services, StatefulSets, PersistentVolumes, Nodes, Pods

pub mod client;
pub mod error;
pub mod quantity;

pub mod cluster_resources;
pub mod config_storage;
pub mod networking;
pub mod workloads;

#[cfg(test)]
pub(crate) mod testing;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};

use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Create `object`, or merge-patch it when it already exists
pub(crate) async fn apply_resource<K>(api: &Api<K>, object: &K) -> K8sResult<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Serialize + Debug,
{
    let name = object
        .meta()
        .name
        .clone()
        .ok_or_else(|| K8sError::Internal(format!("{} without metadata.name", K::kind(&()))))?;

    match api.create(&PostParams::default(), object).await {
        Ok(created) => {
            tracing::info!("Created {} {}", K::kind(&()), name);
            Ok(created)
        }
        Err(e) => {
            let err = K8sError::from(e);
            if !err.is_already_exists() {
                return Err(err);
            }
            tracing::info!("{} {} already exists, patching", K::kind(&()), name);
            let patched = api
                .patch(&name, &PatchParams::default(), &Patch::Merge(object))
                .await?;
            Ok(patched)
        }
    }
}

/// Delete a named object; a missing object is not an error
pub(crate) async fn delete_resource<K>(api: &Api<K>, name: &str) -> K8sResult<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            tracing::info!("Deleted {} {}", K::kind(&()), name);
            Ok(())
        }
        Err(e) => {
            let err = K8sError::from(e);
            if err.is_not_found() {
                tracing::debug!("{} {} already absent", K::kind(&()), name);
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}
