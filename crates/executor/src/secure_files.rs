//! Downloads Azure DevOps secure files into the agent temp directory.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfcli_core::{CommandError, SecureFileAgent};
use tracing::{debug, info};

const API_VERSION: &str = "5.0-preview.1";

/// Connection details for the secure files API.
#[derive(Clone)]
pub struct SecureFileSettings {
    pub collection_uri: String,
    pub project: String,
    pub access_token: String,
    pub temp_directory: PathBuf,
}

impl std::fmt::Debug for SecureFileSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureFileSettings")
            .field("collection_uri", &self.collection_uri)
            .field("project", &self.project)
            .field("temp_directory", &self.temp_directory)
            .finish_non_exhaustive()
    }
}

type VariableLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Maps an agent variable name to its environment form.
pub fn variable_key(name: &str) -> String {
    name.replace(['.', ' '], "_").to_uppercase()
}

pub struct SecureFileDownloader {
    settings: Option<SecureFileSettings>,
    variables: Arc<VariableLookup>,
    client: reqwest::Client,
}

impl SecureFileDownloader {
    pub fn new<F>(settings: Option<SecureFileSettings>, variables: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            settings,
            variables: Arc::new(variables),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Reads per-file name and ticket variables from the process environment.
    pub fn from_env(settings: Option<SecureFileSettings>) -> Self {
        Self::new(settings, |key| std::env::var(key).ok())
    }

    fn file_variable(&self, prefix: &str, reference: &str) -> Result<String, CommandError> {
        let key = format!("{}_{}", prefix, variable_key(reference));
        (self.variables)(&key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                CommandError::SecureFile(format!(
                    "{} is not set; is {} authorized for this pipeline?",
                    key, reference
                ))
            })
    }

    pub fn download_url(
        settings: &SecureFileSettings,
        reference: &str,
        ticket: &str,
    ) -> Result<Url, CommandError> {
        let base = format!(
            "{}/{}/_apis/distributedtask/securefiles/{}",
            settings.collection_uri.trim_end_matches('/'),
            settings.project,
            reference
        );
        let mut url = Url::parse(&base).map_err(|e| {
            CommandError::SecureFile(format!("invalid secure file url {}: {}", base, e))
        })?;
        url.query_pairs_mut()
            .append_pair("ticket", ticket)
            .append_pair("download", "true")
            .append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

fn local_file_name(name: &str) -> Result<&str, CommandError> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CommandError::SecureFile(format!("invalid secure file name: {}", name)))
}

#[async_trait]
impl SecureFileAgent for SecureFileDownloader {
    async fn download_secure_file(&self, reference: &str) -> Result<PathBuf, CommandError> {
        let reference = reference.trim();
        if reference.is_empty() || reference.contains('/') {
            return Err(CommandError::SecureFile(format!(
                "invalid secure file reference: '{}'",
                reference
            )));
        }

        let settings = self.settings.as_ref().ok_or_else(|| {
            CommandError::SecureFile(
                "secure files require the collection uri, project and access token of the job"
                    .to_string(),
            )
        })?;

        let name = self.file_variable("SECUREFILE_NAME", reference)?;
        let ticket = self.file_variable("SECUREFILE_TICKET", reference)?;
        let url = Self::download_url(settings, reference, &ticket)?;
        debug!("Downloading secure file {} from {}", name, url.path());

        let response = self
            .client
            .get(url)
            .bearer_auth(&settings.access_token)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|e| {
                CommandError::SecureFile(format!("failed to download secure file {}: {}", name, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CommandError::SecureFile(format!(
                "failed to download secure file {}: HTTP {}",
                name, status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            CommandError::SecureFile(format!("failed to read secure file {}: {}", name, e))
        })?;

        let path = settings.temp_directory.join(local_file_name(&name)?);
        let saved = match tokio::fs::create_dir_all(&settings.temp_directory).await {
            Ok(()) => tokio::fs::write(&path, &body).await,
            Err(e) => Err(e),
        };
        saved.map_err(|e| {
            CommandError::SecureFile(format!("failed to save {}: {}", path.display(), e))
        })?;

        info!("Downloaded secure file {} to {}", name, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn settings(collection_uri: &str, temp: &Path) -> SecureFileSettings {
        SecureFileSettings {
            collection_uri: collection_uri.to_string(),
            project: "Infra Project".to_string(),
            access_token: "token-123".to_string(),
            temp_directory: temp.to_path_buf(),
        }
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_variable_key() {
        assert_eq!(variable_key("Agent.TempDirectory"), "AGENT_TEMPDIRECTORY");
        assert_eq!(variable_key("a1b2-c3"), "A1B2-C3");
    }

    #[test]
    fn test_download_url() {
        let temp = std::env::temp_dir();
        let settings = settings("https://dev.azure.com/contoso/", &temp);
        let url = SecureFileDownloader::download_url(&settings, "abc-123", "t&k").unwrap();

        assert_eq!(
            url.as_str(),
            concat!(
                "https://dev.azure.com/contoso/Infra%20Project/_apis/distributedtask/securefiles/",
                "abc-123?ticket=t%26k&download=true&api-version=5.0-preview.1",
            )
        );
    }

    #[tokio::test]
    async fn test_missing_settings_is_secure_file_error() {
        let agent = SecureFileDownloader::new(None, lookup(&[]));
        let err = agent.download_secure_file("abc").await.unwrap_err();
        assert!(matches!(err, CommandError::SecureFile(_)));
    }

    #[tokio::test]
    async fn test_missing_ticket_is_secure_file_error() {
        let temp = tempfile::tempdir().unwrap();
        let agent = SecureFileDownloader::new(
            Some(settings("https://dev.azure.com/contoso", temp.path())),
            lookup(&[("SECUREFILE_NAME_ABC", "prod.tfvars")]),
        );

        let err = agent.download_secure_file("abc").await.unwrap_err();
        assert!(err.to_string().contains("SECUREFILE_TICKET_ABC"));
    }

    #[tokio::test]
    async fn test_invalid_reference_is_rejected() {
        let agent = SecureFileDownloader::new(None, lookup(&[]));
        let err = agent.download_secure_file("  ").await.unwrap_err();
        assert!(err.to_string().contains("invalid secure file reference"));
    }

    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request).to_string();
            let response = format!(
                "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        (format!("http://{}", addr), handle)
    }

    fn direct_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_download_writes_file_to_temp_directory() {
        let (uri, server) = serve_once("HTTP/1.1 200 OK", "region = \"westeurope\"\n").await;
        let temp = tempfile::tempdir().unwrap();
        let agent = SecureFileDownloader::new(
            Some(settings(&uri, temp.path())),
            lookup(&[
                ("SECUREFILE_NAME_ABC", "prod.tfvars"),
                ("SECUREFILE_TICKET_ABC", "ticket-1"),
            ]),
        )
        .with_client(direct_client());

        let path = agent.download_secure_file("abc").await.unwrap();

        assert_eq!(path, temp.path().join("prod.tfvars"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "region = \"westeurope\"\n"
        );
        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /Infra%20Project/_apis/distributedtask/securefiles/abc?\
             ticket=ticket-1&download=true"
        ));
        assert!(request.to_lowercase().contains("authorization: bearer token-123"));
    }

    #[tokio::test]
    async fn test_http_failure_is_secure_file_error() {
        let (uri, _server) = serve_once("HTTP/1.1 404 Not Found", "").await;
        let temp = tempfile::tempdir().unwrap();
        let agent = SecureFileDownloader::new(
            Some(settings(&uri, temp.path())),
            lookup(&[
                ("SECUREFILE_NAME_ABC", "prod.tfvars"),
                ("SECUREFILE_TICKET_ABC", "ticket-1"),
            ]),
        )
        .with_client(direct_client());

        let err = agent.download_secure_file("abc").await.unwrap_err();
        assert!(matches!(err, CommandError::SecureFile(ref msg) if msg.contains("404")));
        assert!(!temp.path().join("prod.tfvars").exists());
    }
}
