//! install / precheck / reset

use crate::cli::ClusterArgs;
use crate::config::Config;
use crate::install::{ControlPanel, InstallArgs, InstallStage, Installer, StageContext};
use crate::kubernetes::K8sClient;
use crate::output;
use anyhow::{Context, Result};

/// What to do with the install stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    Install,
    PreCheck,
    Reset,
}

fn stages() -> Vec<Box<dyn InstallStage>> {
    vec![Box::new(ControlPanel)]
}

async fn stage_context(
    args: InstallArgs,
    cluster: &ClusterArgs,
    config: &Config,
) -> Result<StageContext> {
    let kubeconfig = cluster.kubeconfig.as_deref().or(config.kubeconfig.as_deref());
    let context = cluster.context.as_deref().or(config.context.as_deref());

    let client = K8sClient::connect(kubeconfig, context)
        .await
        .context("connect to Kubernetes")?;
    tracing::info!("Using Kubernetes API server {}", client.api_server());

    Ok(StageContext { client, args })
}

pub async fn handle_install_command(
    action: InstallAction,
    args: InstallArgs,
    cluster: &ClusterArgs,
    config: &Config,
) -> Result<()> {
    let ctx = stage_context(args, cluster, config).await?;
    let installer = Installer::new(stages());

    match action {
        InstallAction::Install => {
            installer.install(&ctx).await?;
            output::print_success(&format!(
                "EaseMesh control plane installed in namespace {}",
                ctx.args.namespace
            ));
        }

        InstallAction::PreCheck => {
            installer.pre_check(&ctx).await?;
            output::print_success("Cluster is ready for the EaseMesh control plane");
        }

        InstallAction::Reset => {
            installer.reset(&ctx).await;
            output::print_success(&format!(
                "EaseMesh control plane removed from namespace {}",
                ctx.args.namespace
            ));
        }
    }

    Ok(())
}
