//! Azure Pipelines task that runs terraform commands.

pub mod bootstrap;
pub mod config;
pub mod host;

use tfcli_core::{CommandError, Mediator, Pipeline, TaskHost, TaskInputs, TaskResult};

/// Task input naming the operation to run after the version preamble.
pub const COMMAND_INPUT: &str = "command";

pub async fn run_task(
    mediator: &Mediator,
    inputs: &dyn TaskInputs,
    host: &dyn TaskHost,
) -> TaskResult {
    match inputs.required_input(COMMAND_INPUT) {
        Ok(command) => {
            Pipeline::for_operation(mediator, &command)
                .run_and_report(host)
                .await
        }
        Err(err) => fail(host, &err),
    }
}

fn fail(host: &dyn TaskHost, err: &CommandError) -> TaskResult {
    tracing::error!("{}", err);
    host.set_result(TaskResult::Failed, &err.to_string());
    TaskResult::Failed
}
