//! Sequential driver that runs the preamble and the selected operation.

use crate::error::CommandError;
use crate::handlers::Operation;
use crate::mediator::Mediator;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    Succeeded,
    Failed,
}

impl TaskResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskResult::Succeeded => "Succeeded",
            TaskResult::Failed => "Failed",
        }
    }
}

/// The process hosting the task, which receives the final outcome.
pub trait TaskHost: Send + Sync {
    fn set_result(&self, result: TaskResult, message: &str);
}

pub struct Pipeline<'a> {
    mediator: &'a Mediator,
    steps: Vec<String>,
}

impl<'a> Pipeline<'a> {
    pub fn new(mediator: &'a Mediator) -> Self {
        Self {
            mediator,
            steps: Vec::new(),
        }
    }

    /// `terraform version` always runs before the selected operation.
    pub fn for_operation(mediator: &'a Mediator, selected: &str) -> Self {
        Self::new(mediator)
            .step(Operation::Version.as_str())
            .step(selected)
    }

    pub fn step(mut self, name: impl Into<String>) -> Self {
        self.steps.push(name.into());
        self
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Stops at the first failing step; later steps never start.
    pub async fn run(&self) -> Result<(), CommandError> {
        for step in &self.steps {
            self.mediator.execute(step).await?;
        }
        Ok(())
    }

    pub async fn run_and_report(&self, host: &dyn TaskHost) -> TaskResult {
        match self.run().await {
            Ok(()) => {
                info!("Pipeline completed: {}", self.steps.join(" -> "));
                host.set_result(TaskResult::Succeeded, "");
                TaskResult::Succeeded
            }
            Err(err) => {
                error!("Pipeline failed: {}", err);
                host.set_result(TaskResult::Failed, &err.to_string());
                TaskResult::Failed
            }
        }
    }
}
