//! Thin wrapper over the Azure CLI.
//!
//! Every call starts a fresh session through the injected start function, so
//! no arguments leak from one invocation into the next.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tfcli_core::{CommandError, ExecOptions, ToolSession, Toolchain};
use tracing::info;

pub const AZ_TOOL: &str = "az";

type StartSession = dyn Fn() -> Result<Box<dyn ToolSession>, CommandError> + Send + Sync;

#[derive(Clone)]
pub struct AzureCli {
    start: Arc<StartSession>,
}

impl AzureCli {
    pub fn new<F>(start: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ToolSession>, CommandError> + Send + Sync + 'static,
    {
        Self {
            start: Arc::new(start),
        }
    }

    /// Sessions resolve `tool` through the toolchain on every call.
    pub fn from_toolchain(toolchain: Arc<dyn Toolchain>, tool: impl Into<String>) -> Self {
        let tool = tool.into();
        Self::new(move || {
            let path = toolchain.which(&tool)?;
            Ok(toolchain.tool(&path))
        })
    }

    pub async fn exec_json<T: DeserializeOwned>(&self, line: &str) -> Result<T, CommandError> {
        let mut cli = (self.start)()?;
        cli.line(&format!("{} -o json", line))?;
        let result = cli.exec(ExecOptions::silent()).await?;

        Ok(serde_json::from_str(&result.stdout)?)
    }

    pub async fn exec(&self, line: &str) -> Result<(), CommandError> {
        let mut cli = (self.start)()?;
        cli.line(line)?;
        cli.exec(ExecOptions::default()).await?;
        Ok(())
    }

    pub async fn run<C: AzureCommand>(&self, command: &C) -> Result<C::Output, CommandError> {
        command.execute(self).await
    }
}

/// A typed Azure CLI command.
#[async_trait]
pub trait AzureCommand: Send + Sync {
    type Output: Send;

    async fn execute(&self, cli: &AzureCli) -> Result<Self::Output, CommandError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub tenant_id: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub state: Option<String>,
}

/// Service principal login.
#[derive(Clone)]
pub struct Login {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    pub subscriptions: Vec<Subscription>,
}

#[async_trait]
impl AzureCommand for Login {
    type Output = LoggedIn;

    async fn execute(&self, cli: &AzureCli) -> Result<LoggedIn, CommandError> {
        info!("Logging in to tenant {} as {}", self.tenant_id, self.client_id);
        let line = format!(
            "login --service-principal -t {} -u {} -p {}",
            shell_words::quote(&self.tenant_id),
            shell_words::quote(&self.client_id),
            shell_words::quote(&self.client_secret),
        );
        let subscriptions = cli.exec_json::<Vec<Subscription>>(&line).await?;
        Ok(LoggedIn { subscriptions })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAccount {
    pub subscription_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSet {
    pub subscription_id: String,
}

#[async_trait]
impl AzureCommand for SetAccount {
    type Output = AccountSet;

    async fn execute(&self, cli: &AzureCli) -> Result<AccountSet, CommandError> {
        cli.exec(&format!(
            "account set -s {}",
            shell_words::quote(&self.subscription_id)
        ))
        .await?;
        Ok(AccountSet {
            subscription_id: self.subscription_id.clone(),
        })
    }
}
