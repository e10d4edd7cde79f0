//! Settings derived from the agent's environment variables.

use std::path::PathBuf;
use tfcli_core::provider::TERRAFORM_TOOL;
use tfcli_executor::azure_cli::AZ_TOOL;
use tfcli_executor::SecureFileSettings;

pub const TERRAFORM_TOOL_VAR: &str = "TFCLI_TERRAFORM";
pub const AZ_TOOL_VAR: &str = "TFCLI_AZ";

#[derive(Debug, Clone)]
pub struct AgentEnvironment {
    pub debug: bool,
    pub terraform_tool: String,
    pub az_tool: String,
    /// `None` when the job exposes no collection uri, project or token.
    pub secure_files: Option<SecureFileSettings>,
}

impl AgentEnvironment {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|key| get(key));

        let debug = get("SYSTEM_DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let collection_uri = first(&[
            "ENDPOINT_URL_SYSTEMVSSCONNECTION",
            "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI",
        ]);
        let access_token = first(&[
            "ENDPOINT_AUTH_PARAMETER_SYSTEMVSSCONNECTION_ACCESSTOKEN",
            "SYSTEM_ACCESSTOKEN",
        ]);
        let project = get("SYSTEM_TEAMPROJECT");
        let temp_directory = get("AGENT_TEMPDIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let secure_files = match (collection_uri, project, access_token) {
            (Some(collection_uri), Some(project), Some(access_token)) => Some(SecureFileSettings {
                collection_uri,
                project,
                access_token,
                temp_directory,
            }),
            _ => None,
        };

        Self {
            debug,
            terraform_tool: get(TERRAFORM_TOOL_VAR).unwrap_or_else(|| TERRAFORM_TOOL.to_string()),
            az_tool: get(AZ_TOOL_VAR).unwrap_or_else(|| AZ_TOOL.to_string()),
            secure_files,
        }
    }

    /// Default filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
