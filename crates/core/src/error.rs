use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No handler registered for operation: {0}")]
    NoHandler(String),

    #[error("A handler is already registered for operation: {0}")]
    DuplicateHandler(String),

    #[error("Input required: {0}")]
    MissingInput(String),

    #[error("Secure file error: {0}")]
    SecureFile(String),

    #[error("Unable to locate executable file: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed with exit code {code}: {output}")]
    ToolFailed {
        tool: String,
        code: i32,
        output: String,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::MalformedOutput(err.to_string())
    }
}
