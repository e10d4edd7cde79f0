use super::{run_in_working_directory, HandlerContext};
use crate::command::{LoggedProperties, TerraformCommand};
use crate::error::CommandError;
use crate::handler::CommandHandler;
use async_trait::async_trait;

pub struct TerraformInitHandler {
    ctx: HandlerContext,
}

impl TerraformInitHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn on_execute(&self, command: &TerraformCommand) -> Result<i32, CommandError> {
        let mut terraform = self.ctx.provider.create(command)?;
        run_in_working_directory(terraform.as_mut(), command).await
    }
}

#[async_trait]
impl CommandHandler for TerraformInitHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let init = TerraformCommand::from_inputs(command, self.ctx.inputs.as_ref())?;
        let logged_props =
            LoggedProperties::new().with("commandOptionsDefined", init.options().is_some());

        self.ctx
            .log
            .command(&init, logged_props, self.on_execute(&init))
            .await
    }
}
