use std::process::ExitCode;
use std::sync::Arc;
use tfcli_app::bootstrap::build_services;
use tfcli_app::config::AgentEnvironment;
use tfcli_app::host::PipelineHost;
use tfcli_app::run_task;
use tfcli_core::{TaskHost, TaskResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(env: &AgentEnvironment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = AgentEnvironment::from_env();
    init_tracing(&env);

    let host = Arc::new(PipelineHost::from_env());
    let result = match build_services(&env, host.clone()) {
        Ok(services) => run_task(&services.mediator, host.as_ref(), host.as_ref()).await,
        Err(err) => {
            tracing::error!("{:#}", err);
            host.set_result(TaskResult::Failed, &format!("{:#}", err));
            TaskResult::Failed
        }
    };

    match result {
        TaskResult::Succeeded => ExitCode::SUCCESS,
        TaskResult::Failed => ExitCode::FAILURE,
    }
}
