//! Named command dispatch for the terraform pipeline task.
//!
//! An operation name is resolved by the [`Mediator`] to a registered
//! [`CommandHandler`], which builds a command descriptor from the task
//! inputs and runs it through the [`Logger`].

pub mod agent;
pub mod command;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod inputs;
pub mod logger;
pub mod mediator;
pub mod pipeline;
pub mod provider;
pub mod registry;
pub mod session;

#[cfg(test)]
mod test_support;

pub use agent::SecureFileAgent;
pub use command::{LoggedProperties, PropertyValue, TerraformCommand, TerraformVarsCommand};
pub use error::CommandError;
pub use handler::CommandHandler;
pub use handlers::Operation;
pub use inputs::{MemoryInputs, TaskInputs};
pub use logger::{Logger, TelemetryEvent, TelemetrySink, TracingSink};
pub use mediator::Mediator;
pub use pipeline::{Pipeline, TaskHost, TaskResult};
pub use provider::{CommandProvider, TerraformProvider};
pub use registry::HandlerRegistry;
pub use session::{ExecOptions, ExecOutput, ToolSession, Toolchain};
