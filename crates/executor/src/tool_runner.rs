//! Process-backed tool sessions.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tfcli_core::{CommandError, ExecOptions, ExecOutput, ToolSession, Toolchain};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Resolve `tool` the way a shell would. Paths with a directory part are
/// checked as given.
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let candidate = Path::new(tool);
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    for segment in std::env::split_paths(&path_var) {
        let candidate = segment.join(tool);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
    }

    None
}

/// Split raw option text into arguments.
///
/// Whitespace separates arguments outside quotes. Single quotes group text
/// literally. Inside double quotes only `\"` and `\\` are escapes. Outside
/// quotes a backslash is literal unless it precedes a quote, so Windows paths
/// pass through unchanged and `shell_words::quote` output splits back to the
/// original value.
pub fn split_arguments(text: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err("unterminated single quote".to_string()),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            current.extend(chars.next());
                        }
                        Some(c) => current.push(c),
                        None => return Err("unterminated double quote".to_string()),
                    }
                }
            }
            '\\' if matches!(chars.peek(), Some('\'') | Some('"')) => {
                in_token = true;
                current.extend(chars.next());
            }
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        args.push(current);
    }
    Ok(args)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessToolchain;

impl Toolchain for ProcessToolchain {
    fn which(&self, tool: &str) -> Result<PathBuf, CommandError> {
        find_in_path(tool).ok_or_else(|| CommandError::ToolNotFound(tool.to_string()))
    }

    fn tool(&self, path: &Path) -> Box<dyn ToolSession> {
        Box::new(ToolRunner::new(path))
    }
}

pub struct ToolRunner {
    path: PathBuf,
    args: Vec<String>,
}

impl ToolRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn tool_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[async_trait]
impl ToolSession for ToolRunner {
    fn line(&mut self, text: &str) -> Result<(), CommandError> {
        let args = split_arguments(text).map_err(|e| {
            CommandError::InvalidArguments(format!(
                "failed to parse arguments for {}: {}",
                self.tool_name(),
                e
            ))
        })?;
        self.args.extend(args);
        Ok(())
    }

    fn arg(&mut self, text: &str) {
        self.args.push(text.to_string());
    }

    async fn exec(&mut self, options: ExecOptions) -> Result<ExecOutput, CommandError> {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        if options.silent {
            debug!("Running {}", self.path.display());
        } else {
            info!("[command]{} {}", self.path.display(), self.args.join(" "));
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CommandError::ToolNotFound(self.path.display().to_string())
            }
            _ => CommandError::Io(e),
        })?;

        // Output reaches the task log as it is produced, even when the tool fails.
        let (echo_out, echo_err) = if options.silent {
            (Echo::Off, Echo::Off)
        } else {
            (Echo::Stdout, Echo::Stderr)
        };
        let (stdout, stderr, status) = tokio::try_join!(
            forward(child.stdout.take(), echo_out),
            forward(child.stderr.take(), echo_err),
            child.wait(),
        )?;

        let code = status.code().unwrap_or(-1);
        if !status.success() {
            let message = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(CommandError::ToolFailed {
                tool: self.tool_name(),
                code,
                output: message.to_string(),
            });
        }

        Ok(ExecOutput {
            code,
            stdout,
            stderr,
        })
    }
}

#[derive(Clone, Copy)]
enum Echo {
    Off,
    Stdout,
    Stderr,
}

/// Capture `reader` line by line, echoing each line as it arrives.
async fn forward<R>(reader: Option<R>, echo: Echo) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(reader) = reader else {
        return Ok(captured);
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        let _ = match echo {
            Echo::Off => Ok(()),
            Echo::Stdout => std::io::stdout().write_all(text.as_bytes()),
            Echo::Stderr => std::io::stderr().write_all(text.as_bytes()),
        };
        captured.push_str(&text);
    }
    Ok(captured)
}
