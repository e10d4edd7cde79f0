//! Seams for running external executables.

use crate::error::CommandError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub cwd: Option<PathBuf>,
    /// Do not echo captured output to the task log.
    pub silent: bool,
}

impl ExecOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            silent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            cwd: None,
            silent: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// A pending invocation of one executable with accumulated arguments.
#[async_trait]
pub trait ToolSession: Send {
    /// Append raw text, split into arguments.
    fn line(&mut self, text: &str) -> Result<(), CommandError>;

    /// Append a single argument verbatim.
    fn arg(&mut self, text: &str);

    /// Run to completion. A non-zero exit is an error carrying the captured output.
    async fn exec(&mut self, options: ExecOptions) -> Result<ExecOutput, CommandError>;
}

/// Locates executables and opens sessions bound to them.
pub trait Toolchain: Send + Sync {
    fn which(&self, tool: &str) -> Result<PathBuf, CommandError>;

    fn tool(&self, path: &Path) -> Box<dyn ToolSession>;
}
