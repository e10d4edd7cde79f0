use super::{run_with_secure_vars, HandlerContext};
use crate::command::TerraformVarsCommand;
use crate::error::CommandError;
use crate::handler::CommandHandler;
use async_trait::async_trait;

/// The task runs unattended, so apply never waits for interactive approval.
const AUTO_APPROVE: &str = "-auto-approve";

pub struct TerraformApplyHandler {
    ctx: HandlerContext,
}

impl TerraformApplyHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CommandHandler for TerraformApplyHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let apply = TerraformVarsCommand::from_inputs(command, self.ctx.inputs.as_ref())?;
        let logged_props = apply.logged_properties();

        let body = run_with_secure_vars(&self.ctx, &apply, &[AUTO_APPROVE]);
        self.ctx.log.command(apply.command(), logged_props, body).await
    }
}
