//! Kubernetes objects making up the control panel

use crate::install::args::*;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::{
    ConfigMap, Container, ContainerPort, EnvVar, EnvVarSource, HTTPGetAction, Namespace,
    ObjectFieldSelector, Probe, Service, ServicePort, ServiceSpec, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

const CONFIG_MOUNT_PATH: &str = "/opt/eg-config";
const DATA_MOUNT_PATH: &str = "/opt/eg-data";
const DATA_VOLUME_NAME: &str = "easegress-data";
const CONFIG_VOLUME_NAME: &str = "easegress-config";

pub fn labels() -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), CONTROL_PLANE_NAME.to_string())])
}

/// Label selector matching the control panel pods
pub fn label_selector() -> String {
    format!("app={}", CONTROL_PLANE_NAME)
}

fn metadata(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(labels()),
        ..Default::default()
    }
}

pub fn namespace(args: &InstallArgs) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(args.namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Stable DNS name of one control plane pod behind the headless Service
pub fn member_host(args: &InstallArgs, ordinal: usize) -> String {
    format!(
        "{}-{}.{}.{}",
        CONTROL_PLANE_NAME, ordinal, HEADLESS_SERVICE_NAME, args.namespace
    )
}

/// Server configuration shared by every member; per-pod values are passed as flags
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ServerConfig {
    cluster_name: String,
    cluster_role: &'static str,
    cluster_request_timeout: &'static str,
    cluster_listen_client_urls: Vec<String>,
    cluster_listen_peer_urls: Vec<String>,
    cluster_initial_cluster: String,
    api_addr: String,
    data_dir: String,
    home_dir: String,
    log_dir: String,
}

pub fn server_config_yaml(args: &InstallArgs) -> Result<String, serde_yaml::Error> {
    let initial_cluster = (0..args.replicas)
        .map(|i| {
            format!(
                "{}-{}=http://{}:{}",
                CONTROL_PLANE_NAME,
                i,
                member_host(args, i),
                args.peer_port
            )
        })
        .collect::<Vec<_>>()
        .join(",");

    let config = ServerConfig {
        cluster_name: CONTROL_PLANE_NAME.to_string(),
        cluster_role: "primary",
        cluster_request_timeout: "10s",
        cluster_listen_client_urls: vec![format!("http://0.0.0.0:{}", args.client_port)],
        cluster_listen_peer_urls: vec![format!("http://0.0.0.0:{}", args.peer_port)],
        cluster_initial_cluster: initial_cluster,
        api_addr: format!("0.0.0.0:{}", args.admin_port),
        data_dir: format!("{}/data", DATA_MOUNT_PATH),
        home_dir: DATA_MOUNT_PATH.to_string(),
        log_dir: format!("{}/log", DATA_MOUNT_PATH),
    };

    serde_yaml::to_string(&config)
}

pub fn config_map(args: &InstallArgs) -> Result<ConfigMap, serde_yaml::Error> {
    Ok(ConfigMap {
        metadata: metadata(CONTROL_PLANE_CONFIG_MAP, &args.namespace),
        data: Some(BTreeMap::from([(
            CONTROL_PLANE_CONFIG_FILE.to_string(),
            server_config_yaml(args)?,
        )])),
        ..Default::default()
    })
}

fn port(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_string()),
        protocol: Some("TCP".to_string()),
        port,
        target_port: Some(IntOrString::Int(port)),
        ..Default::default()
    }
}

/// Headless peer Service, in-cluster client Service and the public admin Service
pub fn services(args: &InstallArgs) -> Vec<Service> {
    let headless = Service {
        metadata: metadata(HEADLESS_SERVICE_NAME, &args.namespace),
        spec: Some(ServiceSpec {
            cluster_ip: Some("None".to_string()),
            publish_not_ready_addresses: Some(true),
            selector: Some(labels()),
            ports: Some(vec![
                port(CLIENT_PORT_NAME, args.client_port),
                port(PEER_PORT_NAME, args.peer_port),
            ]),
            ..Default::default()
        }),
        ..Default::default()
    };

    let client = Service {
        metadata: metadata(&args.service_name, &args.namespace),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels()),
            ports: Some(vec![
                port(CLIENT_PORT_NAME, args.client_port),
                port(ADMIN_PORT_NAME, args.admin_port),
            ]),
            ..Default::default()
        }),
        ..Default::default()
    };

    let public = Service {
        metadata: metadata(PUBLIC_SERVICE_NAME, &args.namespace),
        spec: Some(ServiceSpec {
            type_: Some("NodePort".to_string()),
            selector: Some(labels()),
            ports: Some(vec![ServicePort {
                node_port: args.admin_node_port,
                ..port(ADMIN_PORT_NAME, args.admin_port)
            }]),
            ..Default::default()
        }),
        ..Default::default()
    };

    vec![headless, client, public]
}

fn container(args: &InstallArgs) -> Container {
    let pod_name = "$(POD_NAME)";
    let advertise_host = format!(
        "{}.{}.{}",
        pod_name, HEADLESS_SERVICE_NAME, args.namespace
    );

    Container {
        name: "easegress".to_string(),
        image: Some(args.image.clone()),
        image_pull_policy: Some("IfNotPresent".to_string()),
        command: Some(vec!["/opt/easegress/bin/easegress-server".to_string()]),
        args: Some(vec![
            format!(
                "--config-file={}/{}",
                CONFIG_MOUNT_PATH, CONTROL_PLANE_CONFIG_FILE
            ),
            format!("--name={}", pod_name),
            format!(
                "--cluster-advertise-client-urls=http://{}:{}",
                advertise_host, args.client_port
            ),
            format!(
                "--cluster-initial-advertise-peer-urls=http://{}:{}",
                advertise_host, args.peer_port
            ),
        ]),
        env: Some(vec![EnvVar {
            name: "POD_NAME".to_string(),
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    field_path: "metadata.name".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ports: Some(vec![
            container_port(CLIENT_PORT_NAME, args.client_port),
            container_port(PEER_PORT_NAME, args.peer_port),
            container_port(ADMIN_PORT_NAME, args.admin_port),
        ]),
        readiness_probe: Some(Probe {
            http_get: Some(HTTPGetAction {
                path: Some(MEMBER_LIST_PATH.to_string()),
                port: IntOrString::Int(args.admin_port),
                ..Default::default()
            }),
            initial_delay_seconds: Some(10),
            period_seconds: Some(5),
            ..Default::default()
        }),
        volume_mounts: Some(vec![
            VolumeMount {
                name: CONFIG_VOLUME_NAME.to_string(),
                mount_path: CONFIG_MOUNT_PATH.to_string(),
                ..Default::default()
            },
            VolumeMount {
                name: DATA_VOLUME_NAME.to_string(),
                mount_path: DATA_MOUNT_PATH.to_string(),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}

fn container_port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        protocol: Some("TCP".to_string()),
        ..Default::default()
    }
}

/// Built from JSON so the object reads like the manifest it replaces
pub fn statefulset(args: &InstallArgs) -> Result<StatefulSet, serde_json::Error> {
    serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "StatefulSet",
        "metadata": metadata(CONTROL_PLANE_NAME, &args.namespace),
        "spec": {
            "replicas": args.replicas,
            "serviceName": HEADLESS_SERVICE_NAME,
            "podManagementPolicy": "Parallel",
            "selector": { "matchLabels": labels() },
            "template": {
                "metadata": { "labels": labels() },
                "spec": {
                    "containers": [container(args)],
                    "volumes": [{
                        "name": CONFIG_VOLUME_NAME,
                        "configMap": { "name": CONTROL_PLANE_CONFIG_MAP }
                    }]
                }
            },
            "volumeClaimTemplates": [{
                "metadata": { "name": DATA_VOLUME_NAME },
                "spec": {
                    "accessModes": ["ReadWriteOnce"],
                    "storageClassName": args.storage_class,
                    "resources": { "requests": { "storage": args.pv_capacity } }
                }
            }]
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_cluster_lists_every_replica() {
        let args = InstallArgs {
            namespace: "mesh".to_string(),
            replicas: 3,
            ..Default::default()
        };

        let yaml = server_config_yaml(&args).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let initial = parsed["cluster-initial-cluster"].as_str().unwrap();

        let expected: Vec<String> = (0..3)
            .map(|i| {
                format!(
                    "easemesh-control-plane-{i}=\
                     http://easemesh-control-plane-{i}.easemesh-controlplane-hs.mesh:2380"
                )
            })
            .collect();
        assert_eq!(initial, expected.join(","));
        assert_eq!(parsed["api-addr"].as_str(), Some("0.0.0.0:2381"));
    }

    #[test]
    fn test_config_map_carries_server_config() {
        let cm = config_map(&InstallArgs::default()).unwrap();
        assert_eq!(cm.metadata.name.as_deref(), Some(CONTROL_PLANE_CONFIG_MAP));
        assert_eq!(cm.metadata.namespace.as_deref(), Some(DEFAULT_NAMESPACE));
        assert!(cm.data.unwrap().contains_key(CONTROL_PLANE_CONFIG_FILE));
    }

    #[test]
    fn test_public_service_exposes_admin_port() {
        let args = InstallArgs {
            admin_node_port: Some(30381),
            ..Default::default()
        };

        let services = services(&args);
        let names: Vec<_> = services
            .iter()
            .map(|s| s.metadata.name.clone().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![HEADLESS_SERVICE_NAME, DEFAULT_SERVICE_NAME, PUBLIC_SERVICE_NAME]
        );

        let headless = services[0].spec.as_ref().unwrap();
        assert_eq!(headless.cluster_ip.as_deref(), Some("None"));

        let public = services[2].spec.as_ref().unwrap();
        assert_eq!(public.type_.as_deref(), Some("NodePort"));
        let admin = &public.ports.as_ref().unwrap()[0];
        assert_eq!(admin.name.as_deref(), Some(ADMIN_PORT_NAME));
        assert_eq!(admin.port, 2381);
        assert_eq!(admin.node_port, Some(30381));
    }

    #[test]
    fn test_statefulset_claims_volumes_from_storage_class() {
        let args = InstallArgs {
            replicas: 5,
            storage_class: "fast".to_string(),
            pv_capacity: "10Gi".to_string(),
            ..Default::default()
        };

        let sts = statefulset(&args).unwrap();
        assert_eq!(sts.metadata.name.as_deref(), Some(CONTROL_PLANE_NAME));

        let spec = sts.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, Some(5));
        assert_eq!(spec.selector.match_labels, Some(labels()));

        let claim = &spec.volume_claim_templates.as_ref().unwrap()[0];
        let claim_spec = claim.spec.as_ref().unwrap();
        assert_eq!(claim_spec.storage_class_name.as_deref(), Some("fast"));
        assert_eq!(
            claim_spec.access_modes.as_deref(),
            Some(&["ReadWriteOnce".to_string()][..])
        );

        let container = &spec.template.spec.as_ref().unwrap().containers[0];
        assert_eq!(container.image.as_deref(), Some(DEFAULT_IMAGE));

        let json = serde_json::to_value(&sts).unwrap();
        assert_eq!(json["spec"]["serviceName"], HEADLESS_SERVICE_NAME);
        assert_eq!(
            json["spec"]["volumeClaimTemplates"][0]["spec"]["resources"]["requests"]["storage"],
            "10Gi"
        );
        assert_eq!(
            json["spec"]["template"]["spec"]["volumes"][0]["configMap"]["name"],
            CONTROL_PLANE_CONFIG_MAP
        );
    }
}
