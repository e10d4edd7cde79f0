use crate::command::TerraformCommand;
use crate::error::CommandError;
use crate::session::{ToolSession, Toolchain};
use std::sync::Arc;
use tracing::debug;

pub const TERRAFORM_TOOL: &str = "terraform";

/// Builds ready-to-run sessions for command descriptors.
pub trait CommandProvider: Send + Sync {
    fn create(&self, command: &TerraformCommand) -> Result<Box<dyn ToolSession>, CommandError>;
}

pub struct TerraformProvider {
    toolchain: Arc<dyn Toolchain>,
    tool: String,
}

impl TerraformProvider {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self::with_tool(toolchain, TERRAFORM_TOOL)
    }

    pub fn with_tool(toolchain: Arc<dyn Toolchain>, tool: impl Into<String>) -> Self {
        Self {
            toolchain,
            tool: tool.into(),
        }
    }
}

impl CommandProvider for TerraformProvider {
    fn create(&self, command: &TerraformCommand) -> Result<Box<dyn ToolSession>, CommandError> {
        let path = self.toolchain.which(&self.tool)?;
        debug!("Using {} at {}", self.tool, path.display());

        let mut terraform = self.toolchain.tool(&path);
        terraform.arg(command.name());
        if let Some(options) = command.options() {
            terraform.line(options)?;
        }
        Ok(terraform)
    }
}
