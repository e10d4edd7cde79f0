use crate::error::CommandError;
use std::collections::HashMap;

/// Read-only view of the inputs configured on the hosting task.
pub trait TaskInputs: Send + Sync {
    /// Returns the trimmed value, or `None` when unset or blank.
    fn get_input(&self, name: &str) -> Option<String>;

    fn required_input(&self, name: &str) -> Result<String, CommandError> {
        self.get_input(name)
            .ok_or_else(|| CommandError::MissingInput(name.to_string()))
    }
}

/// Inputs held in memory. Used for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryInputs {
    values: HashMap<String, String>,
}

impl MemoryInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl TaskInputs for MemoryInputs {
    fn get_input(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
