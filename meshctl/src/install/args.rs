//! Installation arguments and well-known resource names

use clap::Args;

/// Name of the control plane StatefulSet; pods are `<name>-<ordinal>`
pub const CONTROL_PLANE_NAME: &str = "easemesh-control-plane";
pub const CONTROL_PLANE_CONFIG_MAP: &str = "easemesh-cluster-cm";
pub const CONTROL_PLANE_CONFIG_FILE: &str = "eg-master.yaml";
pub const HEADLESS_SERVICE_NAME: &str = "easemesh-controlplane-hs";
pub const PUBLIC_SERVICE_NAME: &str = "easemesh-controlplane-public";
pub const ADMIN_PORT_NAME: &str = "admin-port";
pub const CLIENT_PORT_NAME: &str = "client-port";
pub const PEER_PORT_NAME: &str = "peer-port";
/// Admin API path listing the cluster members
pub const MEMBER_LIST_PATH: &str = "/apis/v1/status/members";

pub const DEFAULT_NAMESPACE: &str = "easemesh";
pub const DEFAULT_IMAGE: &str = "megaease/easegress:server-sidecar";
pub const DEFAULT_STORAGE_CLASS: &str = "easemesh-storage";
pub const DEFAULT_PV_CAPACITY: &str = "3Gi";
pub const DEFAULT_SERVICE_NAME: &str = "easemesh-controlplane-svc";

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// Namespace the mesh control plane is installed into
    #[arg(long = "mesh-namespace", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Control plane image
    #[arg(long = "image", default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Number of control plane replicas
    #[arg(
        long = "control-plane-replicas",
        default_value_t = 3,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub replicas: usize,

    /// StorageClass the control plane volumes are claimed from
    #[arg(long = "storage-class-name", default_value = DEFAULT_STORAGE_CLASS)]
    pub storage_class: String,

    /// Capacity requested for each control plane volume
    #[arg(long = "persist-volume-capacity", default_value = DEFAULT_PV_CAPACITY)]
    pub pv_capacity: String,

    /// Upper bound in seconds for the control plane health check
    #[arg(
        long = "healthz-max-time",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub healthz_max_time: u64,

    /// Seconds to wait for the cluster to start before checking its health
    #[arg(long = "startup-wait", default_value_t = 10)]
    pub startup_wait: u64,

    #[arg(long = "client-port", default_value_t = 2379)]
    pub client_port: i32,

    #[arg(long = "peer-port", default_value_t = 2380)]
    pub peer_port: i32,

    #[arg(long = "admin-port", default_value_t = 2381)]
    pub admin_port: i32,

    /// Node port exposing the admin API; assigned by Kubernetes when omitted
    #[arg(long = "admin-node-port")]
    pub admin_node_port: Option<i32>,

    /// Name of the in-cluster client Service
    #[arg(long = "service-name", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Remove what was installed when a stage fails
    #[arg(long = "clean-when-failed", default_value_t = true, action = clap::ArgAction::Set)]
    pub clean_when_failed: bool,
}

/// Members needed for a majority of `replicas`
pub fn quorum(replicas: usize) -> usize {
    replicas / 2 + 1
}

impl InstallArgs {
    pub fn quorum(&self) -> usize {
        quorum(self.replicas)
    }
}

impl Default for InstallArgs {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            replicas: 3,
            storage_class: DEFAULT_STORAGE_CLASS.to_string(),
            pv_capacity: DEFAULT_PV_CAPACITY.to_string(),
            healthz_max_time: 60,
            startup_wait: 10,
            client_port: 2379,
            peer_port: 2380,
            admin_port: 2381,
            admin_node_port: None,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            clean_when_failed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: InstallArgs,
    }

    #[test]
    fn test_quorum_is_strict_majority() {
        let quorum = |replicas| InstallArgs { replicas, ..Default::default() }.quorum();
        assert_eq!(quorum(1), 1);
        assert_eq!(quorum(2), 2);
        assert_eq!(quorum(3), 2);
        assert_eq!(quorum(4), 3);
        assert_eq!(quorum(5), 3);
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = TestCli::parse_from(["meshctl"]).args;
        let defaults = InstallArgs::default();

        assert_eq!(parsed.namespace, defaults.namespace);
        assert_eq!(parsed.replicas, defaults.replicas);
        assert_eq!(parsed.pv_capacity, defaults.pv_capacity);
        assert_eq!(parsed.admin_port, defaults.admin_port);
        assert!(parsed.clean_when_failed);
    }

    #[test]
    fn test_clean_when_failed_can_be_disabled() {
        let parsed = TestCli::parse_from([
            "meshctl",
            "--clean-when-failed",
            "false",
            "--control-plane-replicas",
            "5",
        ])
        .args;

        assert!(!parsed.clean_when_failed);
        assert_eq!(parsed.replicas, 5);
    }

    #[test]
    fn test_zero_replicas_and_zero_health_window_are_rejected() {
        assert!(TestCli::try_parse_from(["meshctl", "--control-plane-replicas", "0"]).is_err());
        assert!(TestCli::try_parse_from(["meshctl", "--healthz-max-time", "0"]).is_err());

        let parsed = TestCli::parse_from([
            "meshctl",
            "--control-plane-replicas",
            "1",
            "--healthz-max-time",
            "1",
        ])
        .args;
        assert_eq!(parsed.replicas, 1);
        assert_eq!(parsed.healthz_max_time, 1);
    }
}
