//! Mesh control panel stage
//!
//! Deploys the control panel as a StatefulSet behind three Services and
//! waits until its members form a quorum.

pub mod specs;
pub mod status;
pub mod volumes;

use super::args::{
    CONTROL_PLANE_CONFIG_MAP, CONTROL_PLANE_NAME, HEADLESS_SERVICE_NAME, PUBLIC_SERVICE_NAME,
};
use super::{InstallPhase, InstallStage, StageContext};
use crate::kubernetes::cluster_resources::namespaces;
use crate::kubernetes::config_storage::{configmaps, volumes as pv};
use crate::kubernetes::networking::services;
use crate::kubernetes::workloads::{pods, statefulsets};
use anyhow::{Context, Result};
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::{info, warn};

pub struct ControlPanel;

#[derive(Tabled)]
struct PodRow {
    name: String,
    ready: String,
    status: String,
    restarts: i32,
    node: String,
}

impl From<pods::PodInfo> for PodRow {
    fn from(pod: pods::PodInfo) -> Self {
        Self {
            name: pod.name,
            ready: pod.ready,
            status: pod.phase,
            restarts: pod.restarts,
            node: pod.node.unwrap_or_else(|| "-".to_string()),
        }
    }
}

impl ControlPanel {
    async fn deploy_resources(&self, ctx: &StageContext) -> Result<()> {
        let client = &ctx.client;
        let args = &ctx.args;
        let ns = args.namespace.as_str();

        namespaces::apply_namespace(client, &specs::namespace(args)).await?;

        let config_map = specs::config_map(args).context("render control plane config")?;
        configmaps::apply_configmap(client, ns, &config_map).await?;

        for service in specs::services(args) {
            services::apply_service(client, ns, &service).await?;
        }

        let statefulset = specs::statefulset(args).context("render control plane statefulset")?;
        statefulsets::apply_statefulset(client, ns, &statefulset).await?;

        Ok(())
    }

    async fn check_status(&self, ctx: &StageContext) -> Result<()> {
        let entry_points = status::resolve_entry_points(&ctx.client, &ctx.args.namespace).await?;
        info!("Checking mesh control plane via {:?}", entry_points);

        status::wait_for_quorum(
            &entry_points,
            ctx.args.replicas,
            Duration::from_secs(ctx.args.healthz_max_time),
        )
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl InstallStage for ControlPanel {
    fn name(&self) -> &'static str {
        "mesh control panel"
    }

    async fn pre_check(&self, ctx: &StageContext) -> Result<()> {
        let found = pv::list_persistent_volumes(&ctx.client)
            .await
            .context("list persistent volumes")?;

        let usable = volumes::check_volumes(&found, &ctx.args)?;
        info!("{} persistent volumes usable by the control plane", usable);
        Ok(())
    }

    async fn deploy(&self, ctx: &StageContext) -> Result<()> {
        self.deploy_resources(ctx)
            .await
            .context("deploy mesh control panel resource error")?;

        info!("Waiting {}s for the control plane to start", ctx.args.startup_wait);
        tokio::time::sleep(Duration::from_secs(ctx.args.startup_wait)).await;

        self.check_status(ctx)
            .await
            .context("check mesh control panel status error")
    }

    async fn clear(&self, ctx: &StageContext) -> Result<()> {
        let client = &ctx.client;
        let ns = ctx.args.namespace.as_str();

        if let Err(e) = statefulsets::delete_statefulset(client, ns, CONTROL_PLANE_NAME).await {
            warn!("delete statefulset {} failed: {}", CONTROL_PLANE_NAME, e);
        }

        for name in [HEADLESS_SERVICE_NAME, ctx.args.service_name.as_str(), PUBLIC_SERVICE_NAME] {
            if let Err(e) = services::delete_service(client, ns, name).await {
                warn!("delete service {} failed: {}", name, e);
            }
        }

        if let Err(e) = configmaps::delete_configmap(client, ns, CONTROL_PLANE_CONFIG_MAP).await {
            warn!("delete configmap {} failed: {}", CONTROL_PLANE_CONFIG_MAP, e);
        }

        Ok(())
    }

    async fn describe(&self, ctx: &StageContext, phase: InstallPhase) -> String {
        match phase {
            InstallPhase::Begin => format!(
                "Begin to install mesh control plane service in the namespace {}",
                ctx.args.namespace
            ),
            InstallPhase::End => {
                let deployed = format!(
                    "\nMesh control plane statefulset {} deployed successfully\n",
                    CONTROL_PLANE_NAME
                );
                let selector = specs::label_selector();

                match pods::list_pods(&ctx.client, &ctx.args.namespace, &selector).await {
                    Ok(found) if !found.is_empty() => {
                        let rows: Vec<PodRow> = found.into_iter().map(PodRow::from).collect();
                        format!("{}{}\n", deployed, Table::new(rows))
                    }
                    Ok(_) => deployed,
                    Err(e) => {
                        warn!("list control plane pods failed: {}", e);
                        deployed
                    }
                }
            }
        }
    }
}
