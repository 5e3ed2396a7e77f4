//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with the context it was built from.

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;

use super::error::{K8sError, K8sResult};

/// Wrapper around kube-rs Client
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    api_server: String,
}

impl K8sClient {
    /// Build a client from an explicit kubeconfig file, the default kubeconfig
    /// with a named context, or the inferred environment (in-cluster or `~/.kube/config`)
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> K8sResult<Self> {
        let options = KubeConfigOptions {
            context: context.map(String::from),
            ..Default::default()
        };

        let config = match (kubeconfig, context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    K8sError::InvalidKubeconfig(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| invalid_kubeconfig("create", e))?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| invalid_kubeconfig("create", e))?,
            (None, None) => Config::infer()
                .await
                .map_err(|e| invalid_kubeconfig("infer", e))?,
        };

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();
        let client = Client::try_from(config)
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            api_server,
        })
    }

    /// Get the inner kube-rs Client
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }
}

fn invalid_kubeconfig(action: &str, e: impl std::fmt::Display) -> K8sError {
    K8sError::InvalidKubeconfig(format!("Failed to {} config: {}", action, e))
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("api_server", &self.api_server)
            .finish()
    }
}
