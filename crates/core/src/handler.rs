use crate::error::CommandError;
use async_trait::async_trait;

/// Executes one named operation and returns its exit status.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, command: &str) -> Result<i32, CommandError>;
}
