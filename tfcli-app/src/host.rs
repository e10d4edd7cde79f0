//! Agent-facing side of the task: `INPUT_*` variables in, `##vso` logging
//! commands out.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tfcli_core::{TaskHost, TaskInputs, TaskResult};

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable holding the task input `name`.
pub fn input_variable(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Logging command that reports one error to the pipeline.
pub fn issue_command(message: &str) -> String {
    format!("##vso[task.issue type=error;]{}", escape_data(message))
}

/// Logging command that sets the final result of the task.
pub fn complete_command(result: TaskResult, message: &str) -> String {
    format!(
        "##vso[task.complete result={};]{}",
        result.as_str(),
        escape_data(message)
    )
}

pub struct PipelineHost {
    lookup: Lookup,
    out: Mutex<Box<dyn Write + Send>>,
}

impl PipelineHost {
    pub fn new<F, W>(lookup: F, out: W) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
        W: Write + Send + 'static,
    {
        Self {
            lookup: Arc::new(lookup),
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn from_env() -> Self {
        Self::new(|key| std::env::var(key).ok(), io::stdout())
    }

    fn emit(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Nothing left to report to if the agent's stdout is gone.
        let _ = writeln!(out, "{}", line).and_then(|_| out.flush());
    }
}

impl TaskInputs for PipelineHost {
    fn get_input(&self, name: &str) -> Option<String> {
        (self.lookup)(&input_variable(name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl TaskHost for PipelineHost {
    fn set_result(&self, result: TaskResult, message: &str) {
        if result == TaskResult::Failed && !message.is_empty() {
            self.emit(&issue_command(message));
        }
        self.emit(&complete_command(result, message));
    }
}
