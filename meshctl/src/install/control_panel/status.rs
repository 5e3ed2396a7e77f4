//! Readiness of the control panel cluster
//!
//! The admin API is reached through the public NodePort Service on every
//! node. The cluster is ready once any entry point reports at least a
//! quorum of members.

use crate::http::{HttpError, HttpJson, RetryOptions};
use crate::install::args::{quorum, ADMIN_PORT_NAME, MEMBER_LIST_PATH, PUBLIC_SERVICE_NAME};
use crate::kubernetes::cluster_resources::nodes;
use crate::kubernetes::networking::services;
use crate::kubernetes::{K8sClient, K8sError};
use k8s_openapi::api::core::v1::{Node, Service};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const ATTEMPTS_PER_ENTRY_POINT: u32 = 3;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("get mesh control plane entrypoint failed: {0}")]
    Kubernetes(#[from] K8sError),

    #[error("service {service} has no node port named {port}")]
    NoAdminNodePort { service: String, port: String },

    #[error("no node addresses found for service {0}")]
    NoEntryPoints(String),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("check control plane member list error, return status code is :{0}")]
    UnexpectedStatus(u16),

    #[error("parse member body error: {0}")]
    InvalidMembers(#[from] serde_yaml::Error),

    #[error("easemesh control plane is not ready, expect {expected} of replicas, but {actual}")]
    NotEnoughMembers { expected: usize, actual: usize },

    #[error("mesh control plane is not ready")]
    NotReady,
}

/// Node port of the named port on a NodePort Service
pub fn admin_node_port(service: &Service, port_name: &str) -> Option<i32> {
    service
        .spec
        .as_ref()?
        .ports
        .as_ref()?
        .iter()
        .find(|p| p.name.as_deref() == Some(port_name))?
        .node_port
}

/// `http://<node ip>:<node port>` for every node
pub fn entry_points(service: &Service, nodes: &[Node]) -> Result<Vec<String>, StatusError> {
    let service_name = service.metadata.name.clone().unwrap_or_default();

    let port =
        admin_node_port(service, ADMIN_PORT_NAME).ok_or_else(|| StatusError::NoAdminNodePort {
            service: service_name.clone(),
            port: ADMIN_PORT_NAME.to_string(),
        })?;

    let urls: Vec<String> = nodes::internal_ips(nodes)
        .into_iter()
        .map(|ip| format!("http://{}:{}", ip, port))
        .collect();

    if urls.is_empty() {
        return Err(StatusError::NoEntryPoints(service_name));
    }

    Ok(urls)
}

pub async fn resolve_entry_points(
    client: &K8sClient,
    namespace: &str,
) -> Result<Vec<String>, StatusError> {
    let service = services::get_service(client, namespace, PUBLIC_SERVICE_NAME).await?;
    let nodes = nodes::list_nodes(client).await?;

    entry_points(&service, &nodes)
}

/// Member list reported by the admin API; each member is a free-form map
fn parse_members(body: &[u8]) -> Result<Vec<serde_yaml::Mapping>, serde_yaml::Error> {
    serde_yaml::from_slice(body)
}

/// Poll the entry points in order until one reports a quorum of members
///
/// `max_time` is shared evenly between the entry points.
pub async fn wait_for_quorum(
    entry_points: &[String],
    replicas: usize,
    max_time: Duration,
) -> Result<(), StatusError> {
    if entry_points.is_empty() {
        return Err(StatusError::NotReady);
    }

    let quorum = quorum(replicas);
    let per_entry = max_time / entry_points.len() as u32;

    let http = HttpJson::new().with_retry(RetryOptions::new(
        ATTEMPTS_PER_ENTRY_POINT,
        per_entry / ATTEMPTS_PER_ENTRY_POINT,
        move |outcome| match outcome {
            Err(e) => {
                if e.is_connect() {
                    debug!("control plane not reachable yet: {}", e);
                } else {
                    warn!("request member list error: {}", e);
                }
                true
            }
            Ok(reply) => match parse_members(&reply.body) {
                Ok(members) => members.len() < quorum,
                Err(e) => {
                    warn!("parse member body {:?} error: {}", reply.text(), e);
                    true
                }
            },
        },
    ));

    for entry in entry_points {
        match check_members(&http, entry, replicas, quorum, per_entry).await {
            Ok(members) => {
                info!("Mesh control plane reports {} members via {}", members, entry);
                return Ok(());
            }
            Err(e) => {
                warn!(
                    "check mesh control plane status failed, ignored check next node, \
                     current error is: {}",
                    e
                );
            }
        }
    }

    Err(StatusError::NotReady)
}

async fn check_members(
    http: &HttpJson,
    entry: &str,
    replicas: usize,
    quorum: usize,
    timeout: Duration,
) -> Result<usize, StatusError> {
    let url = format!("{}{}", entry, MEMBER_LIST_PATH);
    let reply = http
        .get(&url, Some(timeout))
        .await
        .map_err(|source| StatusError::Http {
            url: url.clone(),
            source,
        })?;

    reply.handle_response(|body, status| {
        if status != 200 {
            return Err(StatusError::UnexpectedStatus(status));
        }

        let members = parse_members(body)?;
        if members.len() < quorum {
            return Err(StatusError::NotEnoughMembers {
                expected: replicas,
                actual: members.len(),
            });
        }

        Ok(members.len())
    })
}
