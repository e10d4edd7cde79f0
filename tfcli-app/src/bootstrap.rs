use crate::config::AgentEnvironment;
use anyhow::{Context, Result};
use std::sync::Arc;
use tfcli_core::handlers::{register_all, HandlerContext};
use tfcli_core::{HandlerRegistry, Logger, Mediator, TaskInputs, TerraformProvider, Toolchain};
use tfcli_executor::{AzureCli, ProcessToolchain, SecureFileDownloader};
use tracing::debug;

/// Collaborators available to the task once startup wiring succeeds.
pub struct TaskServices {
    pub mediator: Mediator,
    /// Resolves the configured `az` executable on each call.
    pub azure: AzureCli,
}

/// Wire the process-backed collaborators, registering every terraform
/// operation on the mediator.
pub fn build_services(
    env: &AgentEnvironment,
    inputs: Arc<dyn TaskInputs>,
) -> Result<TaskServices> {
    let toolchain: Arc<dyn Toolchain> = Arc::new(ProcessToolchain);
    let ctx = HandlerContext {
        provider: Arc::new(TerraformProvider::with_tool(
            toolchain.clone(),
            env.terraform_tool.clone(),
        )),
        agent: Arc::new(SecureFileDownloader::from_env(env.secure_files.clone())),
        inputs,
        log: Logger::tracing(),
    };

    let mut registry = HandlerRegistry::new();
    register_all(&mut registry, &ctx).context("Failed to register terraform handlers")?;
    debug!("Registered operations: {:?}", registry.list());

    Ok(TaskServices {
        mediator: Mediator::new(Arc::new(registry)),
        azure: AzureCli::from_toolchain(toolchain, env.az_tool.clone()),
    })
}
