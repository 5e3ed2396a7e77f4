//! Staged installation onto Kubernetes
//!
//! An installation is an ordered list of [`InstallStage`]s. Every stage's
//! pre-check runs before anything is deployed; stages then deploy in order
//! and are cleared in reverse order on failure or reset.

pub mod args;
pub mod control_panel;

pub use args::InstallArgs;
pub use control_panel::ControlPanel;

use crate::kubernetes::K8sClient;
use crate::output;
use anyhow::{Context, Result};
use tracing::{error, info, warn};

/// Point in a stage's installation a description is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Begin,
    End,
}

/// Everything a stage needs to talk to the cluster
#[derive(Debug, Clone)]
pub struct StageContext {
    pub client: K8sClient,
    pub args: InstallArgs,
}

/// One installable component
#[async_trait::async_trait]
pub trait InstallStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Verify the cluster can host the component; nothing is created
    async fn pre_check(&self, ctx: &StageContext) -> Result<()>;

    /// Create the component's resources and wait until it is usable
    async fn deploy(&self, ctx: &StageContext) -> Result<()>;

    /// Remove the component's resources, best effort
    async fn clear(&self, ctx: &StageContext) -> Result<()>;

    /// Human-readable progress text; empty when there is nothing to say
    async fn describe(&self, ctx: &StageContext, phase: InstallPhase) -> String;
}

pub struct Installer {
    stages: Vec<Box<dyn InstallStage>>,
}

impl Installer {
    pub fn new(stages: Vec<Box<dyn InstallStage>>) -> Self {
        Self { stages }
    }

    /// Run every pre-check without deploying
    pub async fn pre_check(&self, ctx: &StageContext) -> Result<()> {
        for stage in &self.stages {
            info!("Running pre-check of {}", stage.name());
            stage
                .pre_check(ctx)
                .await
                .with_context(|| format!("{} pre-check failed", stage.name()))?;
        }
        Ok(())
    }

    pub async fn install(&self, ctx: &StageContext) -> Result<()> {
        self.pre_check(ctx).await?;

        for (index, stage) in self.stages.iter().enumerate() {
            print_description(stage.describe(ctx, InstallPhase::Begin).await);

            if let Err(e) = stage.deploy(ctx).await {
                error!("Deploying {} failed: {:#}", stage.name(), e);
                if ctx.args.clean_when_failed {
                    warn!("Clearing installed stages");
                    clear_stages(&self.stages[..=index], ctx).await;
                }
                return Err(e.context(format!("{} deploy failed", stage.name())));
            }

            print_description(stage.describe(ctx, InstallPhase::End).await);
        }

        Ok(())
    }

    /// Clear every stage, last one first
    pub async fn reset(&self, ctx: &StageContext) {
        clear_stages(&self.stages, ctx).await;
    }
}

async fn clear_stages(stages: &[Box<dyn InstallStage>], ctx: &StageContext) {
    for stage in stages.iter().rev() {
        info!("Clearing {}", stage.name());
        if let Err(e) = stage.clear(ctx).await {
            warn!("Clearing {} failed: {:#}", stage.name(), e);
        }
    }
}

fn print_description(description: String) {
    if !description.is_empty() {
        output::print_info(&description);
    }
}
