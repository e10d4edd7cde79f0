use super::{run_in_working_directory, HandlerContext};
use crate::command::{LoggedProperties, TerraformCommand, WORKING_DIRECTORY_INPUT};
use crate::error::CommandError;
use crate::handler::CommandHandler;
use async_trait::async_trait;

pub struct TerraformVersionHandler {
    ctx: HandlerContext,
}

impl TerraformVersionHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    async fn on_execute(&self, command: &TerraformCommand) -> Result<i32, CommandError> {
        let mut terraform = self.ctx.provider.create(command)?;
        run_in_working_directory(terraform.as_mut(), command).await
    }
}

#[async_trait]
impl CommandHandler for TerraformVersionHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let working_directory = self.ctx.inputs.required_input(WORKING_DIRECTORY_INPUT)?;
        let version = TerraformCommand::new(command, working_directory, None)?;

        self.ctx
            .log
            .command(&version, LoggedProperties::new(), self.on_execute(&version))
            .await
    }
}
