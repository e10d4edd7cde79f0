use crate::error::CommandError;
use crate::registry::HandlerRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves operation names to handlers and runs them.
pub struct Mediator {
    registry: Arc<HandlerRegistry>,
}

impl Mediator {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Lookup failures happen before the handler can touch anything external.
    pub async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        let handler = self
            .registry
            .get(command)
            .ok_or_else(|| CommandError::NoHandler(command.to_string()))?;

        info!("Executing terraform {}", command);
        let status = handler.execute(command).await?;
        debug!("terraform {} exited with status {}", command, status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingHandler;

    #[tokio::test]
    async fn test_execute_invokes_only_the_named_handler() {
        let plan = CountingHandler::ok();
        let apply = CountingHandler::ok();
        let mut registry = HandlerRegistry::new();
        registry.register("plan", plan.clone()).unwrap();
        registry.register("apply", apply.clone()).unwrap();
        let mediator = Mediator::new(Arc::new(registry));

        let status = mediator.execute("plan").await.unwrap();

        assert_eq!(status, 0);
        assert_eq!(plan.calls(), vec!["plan".to_string()]);
        assert!(apply.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_operation_is_a_lookup_error() {
        let init = CountingHandler::ok();
        let mut registry = HandlerRegistry::new();
        registry.register("init", init.clone()).unwrap();
        let mediator = Mediator::new(Arc::new(registry));

        let err = mediator.execute("nonexistent").await.unwrap_err();

        assert!(matches!(err, CommandError::NoHandler(ref name) if name == "nonexistent"));
        assert_eq!(err.to_string(), "No handler registered for operation: nonexistent");
        assert!(init.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handler_failure_propagates_unchanged() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("apply", CountingHandler::failing("Error: state locked"))
            .unwrap();
        let mediator = Mediator::new(Arc::new(registry));

        let err = mediator.execute("apply").await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::ToolFailed { code: 1, ref output, .. } if output == "Error: state locked"
        ));
    }
}
