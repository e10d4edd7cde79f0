use super::{run_with_secure_vars, HandlerContext};
use crate::command::TerraformVarsCommand;
use crate::error::CommandError;
use crate::handler::CommandHandler;
use async_trait::async_trait;

pub struct TerraformValidateHandler {
    ctx: HandlerContext,
}

impl TerraformValidateHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CommandHandler for TerraformValidateHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let validate = TerraformVarsCommand::from_inputs(command, self.ctx.inputs.as_ref())?;
        let logged_props = validate.logged_properties();

        let body = run_with_secure_vars(&self.ctx, &validate, &[]);
        self.ctx.log.command(validate.command(), logged_props, body).await
    }
}
