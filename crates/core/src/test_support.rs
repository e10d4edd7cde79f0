//! Shared mocks for unit tests.

use crate::agent::SecureFileAgent;
use crate::error::CommandError;
use crate::handler::CommandHandler;
use crate::logger::{TelemetryEvent, TelemetrySink};
use crate::pipeline::{TaskHost, TaskResult};
use crate::session::{ExecOptions, ExecOutput, ToolSession, Toolchain};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Arg(String),
    Line(String),
    Exec(Option<PathBuf>),
}

#[derive(Clone)]
enum Outcome {
    Success,
    Failure { code: i32, output: String },
}

#[derive(Clone)]
pub struct RecordedSession {
    pub path: PathBuf,
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl RecordedSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn var_file_args(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SessionCall::Arg(arg) if arg.starts_with("-var-file=") => Some(arg),
                _ => None,
            })
            .collect()
    }
}

struct RecordingSession {
    tool: String,
    calls: Arc<Mutex<Vec<SessionCall>>>,
    outcome: Outcome,
}

#[async_trait]
impl ToolSession for RecordingSession {
    fn line(&mut self, text: &str) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push(SessionCall::Line(text.to_string()));
        Ok(())
    }

    fn arg(&mut self, text: &str) {
        self.calls.lock().unwrap().push(SessionCall::Arg(text.to_string()));
    }

    async fn exec(&mut self, options: ExecOptions) -> Result<ExecOutput, CommandError> {
        self.calls.lock().unwrap().push(SessionCall::Exec(options.cwd.clone()));
        match &self.outcome {
            Outcome::Success => Ok(ExecOutput {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            }),
            Outcome::Failure { code, output } => Err(CommandError::ToolFailed {
                tool: self.tool.clone(),
                code: *code,
                output: output.clone(),
            }),
        }
    }
}

pub struct RecordingToolchain {
    available: bool,
    outcome: Outcome,
    sessions: Mutex<Vec<RecordedSession>>,
}

impl RecordingToolchain {
    fn build(available: bool, outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            available,
            outcome,
            sessions: Mutex::new(Vec::new()),
        })
    }

    pub fn new() -> Arc<Self> {
        Self::build(true, Outcome::Success)
    }

    pub fn without_tools() -> Arc<Self> {
        Self::build(false, Outcome::Success)
    }

    pub fn failing(code: i32, output: &str) -> Arc<Self> {
        Self::build(
            true,
            Outcome::Failure {
                code,
                output: output.to_string(),
            },
        )
    }

    pub fn sessions(&self) -> Vec<RecordedSession> {
        self.sessions.lock().unwrap().clone()
    }
}

impl Toolchain for RecordingToolchain {
    fn which(&self, tool: &str) -> Result<PathBuf, CommandError> {
        if self.available {
            Ok(PathBuf::from("/usr/bin").join(tool))
        } else {
            Err(CommandError::ToolNotFound(tool.to_string()))
        }
    }

    fn tool(&self, path: &Path) -> Box<dyn ToolSession> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        self.sessions.lock().unwrap().push(RecordedSession {
            path: path.to_path_buf(),
            calls: calls.clone(),
        });
        Box::new(RecordingSession {
            tool: path.display().to_string(),
            calls,
            outcome: self.outcome.clone(),
        })
    }
}

pub struct StaticAgent {
    path: PathBuf,
    fail: bool,
    downloads: Mutex<Vec<String>>,
}

impl StaticAgent {
    pub fn new(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: PathBuf::from(path),
            fail: false,
            downloads: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            path: PathBuf::new(),
            fail: true,
            downloads: Mutex::new(Vec::new()),
        })
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecureFileAgent for StaticAgent {
    async fn download_secure_file(&self, reference: &str) -> Result<PathBuf, CommandError> {
        self.downloads.lock().unwrap().push(reference.to_string());
        if self.fail {
            return Err(CommandError::SecureFile(format!(
                "secure file {} not found",
                reference
            )));
        }
        Ok(self.path.clone())
    }
}

#[derive(Default)]
pub struct CapturingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TelemetrySink for CapturingSink {
    fn record(&self, event: &TelemetryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct CountingHandler {
    fail_with: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl CountingHandler {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(output: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(output.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandHandler for CountingHandler {
    async fn execute(&self, command: &str) -> Result<i32, CommandError> {
        self.calls.lock().unwrap().push(command.to_string());
        match &self.fail_with {
            Some(output) => Err(CommandError::ToolFailed {
                tool: "terraform".into(),
                code: 1,
                output: output.clone(),
            }),
            None => Ok(0),
        }
    }
}

#[derive(Default)]
pub struct RecordingHost {
    results: Mutex<Vec<(TaskResult, String)>>,
}

impl RecordingHost {
    pub fn results(&self) -> Vec<(TaskResult, String)> {
        self.results.lock().unwrap().clone()
    }
}

impl TaskHost for RecordingHost {
    fn set_result(&self, result: TaskResult, message: &str) {
        self.results.lock().unwrap().push((result, message.to_string()));
    }
}
