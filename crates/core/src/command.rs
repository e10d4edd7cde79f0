//! Command descriptors and the properties logged alongside them.

use crate::error::CommandError;
use crate::inputs::TaskInputs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const WORKING_DIRECTORY_INPUT: &str = "workingDirectory";
pub const COMMAND_OPTIONS_INPUT: &str = "commandOptions";
pub const SECURE_VARS_FILE_INPUT: &str = "secureVarsFile";

/// Immutable description of one terraform invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformCommand {
    name: String,
    working_directory: PathBuf,
    options: Option<String>,
}

impl TerraformCommand {
    pub fn new(
        name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        options: Option<String>,
    ) -> Result<Self, CommandError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CommandError::MissingInput("command".into()));
        }

        let working_directory = working_directory.into();
        if working_directory.as_os_str().is_empty() {
            return Err(CommandError::MissingInput(WORKING_DIRECTORY_INPUT.into()));
        }

        Ok(Self {
            name,
            working_directory,
            options: options.filter(|o| !o.trim().is_empty()),
        })
    }

    /// Build from the `workingDirectory` and `commandOptions` inputs.
    pub fn from_inputs(name: &str, inputs: &dyn TaskInputs) -> Result<Self, CommandError> {
        let working_directory = inputs.required_input(WORKING_DIRECTORY_INPUT)?;
        Self::new(name, working_directory, inputs.get_input(COMMAND_OPTIONS_INPUT))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn options(&self) -> Option<&str> {
        self.options.as_deref()
    }
}

/// A terraform command that may load variables from a secure file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformVarsCommand {
    command: TerraformCommand,
    secure_vars_file: Option<String>,
}

impl TerraformVarsCommand {
    pub fn new(command: TerraformCommand, secure_vars_file: Option<String>) -> Self {
        Self {
            command,
            secure_vars_file: secure_vars_file.filter(|f| !f.trim().is_empty()),
        }
    }

    pub fn from_inputs(name: &str, inputs: &dyn TaskInputs) -> Result<Self, CommandError> {
        let command = TerraformCommand::from_inputs(name, inputs)?;
        Ok(Self::new(command, inputs.get_input(SECURE_VARS_FILE_INPUT)))
    }

    pub fn command(&self) -> &TerraformCommand {
        &self.command
    }

    pub fn secure_vars_file(&self) -> Option<&str> {
        self.secure_vars_file.as_deref()
    }

    /// Booleans only; the option text and file reference never reach telemetry.
    pub fn logged_properties(&self) -> LoggedProperties {
        LoggedProperties::new()
            .with("secureVarsFileDefined", self.secure_vars_file.is_some())
            .with("commandOptionsDefined", self.command.options.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

/// Scalar properties attached to one execution's telemetry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LoggedProperties(BTreeMap<String, PropertyValue>);

impl LoggedProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
