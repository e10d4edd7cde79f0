use super::{run_with_secure_vars, HandlerContext};
use crate::command::TerraformVarsCommand;
use crate::error::CommandError;
use crate::handler::CommandHandler;
use async_trait::async_trait;

pub struct TerraformPlanHandler {
    ctx: HandlerContext,
}

impl TerraformPlanHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CommandHandler for TerraformPlanHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let plan = TerraformVarsCommand::from_inputs(command, self.ctx.inputs.as_ref())?;
        let logged_props = plan.logged_properties();

        let body = run_with_secure_vars(&self.ctx, &plan, &[]);
        self.ctx.log.command(plan.command(), logged_props, body).await
    }
}
