//! Node operations

use crate::kubernetes::client::K8sClient;
use crate::kubernetes::error::K8sResult;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};

/// List all nodes
pub async fn list_nodes(client: &K8sClient) -> K8sResult<Vec<Node>> {
    let nodes: Api<Node> = Api::all(client.inner().clone());
    let list = nodes.list(&ListParams::default()).await?;

    Ok(list.items)
}

/// `InternalIP` addresses of the given nodes, in node order
pub fn internal_ips(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|node| node.status.as_ref()?.addresses.as_ref())
        .flat_map(|addresses| {
            addresses
                .iter()
                .filter(|a| a.type_ == "InternalIP")
                .map(|a| a.address.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{NodeAddress, NodeStatus};

    fn node(addresses: &[(&str, &str)]) -> Node {
        Node {
            status: Some(NodeStatus {
                addresses: Some(
                    addresses
                        .iter()
                        .map(|(type_, address)| NodeAddress {
                            type_: type_.to_string(),
                            address: address.to_string(),
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_internal_ips_skip_other_address_types() {
        let nodes = vec![
            node(&[("Hostname", "worker-1"), ("InternalIP", "10.0.0.11")]),
            node(&[("ExternalIP", "34.1.2.3"), ("InternalIP", "10.0.0.12")]),
            Node::default(),
        ];

        assert_eq!(internal_ips(&nodes), vec!["10.0.0.11", "10.0.0.12"]);
    }
}
