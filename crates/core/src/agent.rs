use crate::error::CommandError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Materializes secure files managed by the hosting service.
///
/// The returned path is only meaningful for the rest of the current command;
/// cleanup is left to the host.
#[async_trait]
pub trait SecureFileAgent: Send + Sync {
    async fn download_secure_file(&self, reference: &str) -> Result<PathBuf, CommandError>;
}
