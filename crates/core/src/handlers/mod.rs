//! One handler per terraform operation.

mod apply;
mod init;
mod plan;
mod validate;
mod version;

pub use apply::TerraformApplyHandler;
pub use init::TerraformInitHandler;
pub use plan::TerraformPlanHandler;
pub use validate::TerraformValidateHandler;
pub use version::TerraformVersionHandler;

use crate::agent::SecureFileAgent;
use crate::command::{TerraformCommand, TerraformVarsCommand};
use crate::error::CommandError;
use crate::handler::CommandHandler;
use crate::inputs::TaskInputs;
use crate::logger::Logger;
use crate::provider::CommandProvider;
use crate::registry::HandlerRegistry;
use crate::session::{ExecOptions, ToolSession};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct HandlerContext {
    pub provider: Arc<dyn CommandProvider>,
    pub agent: Arc<dyn SecureFileAgent>,
    pub inputs: Arc<dyn TaskInputs>,
    pub log: Logger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Version,
    Validate,
    Plan,
    Apply,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Init,
        Operation::Version,
        Operation::Validate,
        Operation::Plan,
        Operation::Apply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Version => "version",
            Operation::Validate => "validate",
            Operation::Plan => "plan",
            Operation::Apply => "apply",
        }
    }

    pub fn handler(&self, ctx: &HandlerContext) -> Arc<dyn CommandHandler> {
        match self {
            Operation::Init => Arc::new(TerraformInitHandler::new(ctx.clone())),
            Operation::Version => Arc::new(TerraformVersionHandler::new(ctx.clone())),
            Operation::Validate => Arc::new(TerraformValidateHandler::new(ctx.clone())),
            Operation::Plan => Arc::new(TerraformPlanHandler::new(ctx.clone())),
            Operation::Apply => Arc::new(TerraformApplyHandler::new(ctx.clone())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CommandError::NoHandler(s.to_string()))
    }
}

/// Register a handler for every operation.
pub fn register_all(
    registry: &mut HandlerRegistry,
    ctx: &HandlerContext,
) -> Result<(), CommandError> {
    for op in Operation::ALL {
        registry.register(op.as_str(), op.handler(ctx))?;
    }
    Ok(())
}

async fn append_secure_vars(
    agent: &dyn SecureFileAgent,
    terraform: &mut dyn ToolSession,
    secure_vars_file: Option<&str>,
) -> Result<(), CommandError> {
    if let Some(reference) = secure_vars_file {
        let path = agent.download_secure_file(reference).await?;
        debug!("Loading variables from secure file {}", reference);
        terraform.arg(&format!("-var-file={}", path.display()));
    }
    Ok(())
}

/// Extra arguments follow the options; the secure variables file goes last.
async fn run_with_secure_vars(
    ctx: &HandlerContext,
    command: &TerraformVarsCommand,
    extra_args: &[&str],
) -> Result<i32, CommandError> {
    let mut terraform = ctx.provider.create(command.command())?;
    for arg in extra_args {
        terraform.arg(arg);
    }
    append_secure_vars(
        ctx.agent.as_ref(),
        terraform.as_mut(),
        command.secure_vars_file(),
    )
    .await?;
    run_in_working_directory(terraform.as_mut(), command.command()).await
}

async fn run_in_working_directory(
    terraform: &mut dyn ToolSession,
    command: &TerraformCommand,
) -> Result<i32, CommandError> {
    let output = terraform
        .exec(ExecOptions::in_dir(command.working_directory()))
        .await?;
    Ok(output.code)
}
