//! Identity service client and local token storage

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::ClientError;
use super::store::parse_json;
use crate::config::StoreConfig;

/// Token and user profile returned by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,

    /// Opaque profile document as sent by the service
    #[serde(rename = "usuario", default)]
    pub user: serde_json::Value,
}

impl Credentials {
    /// Display name from the profile, when the service provides one
    pub fn user_name(&self) -> Option<&str> {
        self.user.get("nome").and_then(|n| n.as_str())
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
}

/// `POST /auth/login` and `POST /auth/register`
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
    http: Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "AuthClient::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, ClientError> {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, ClientError> {
        debug!(%email, "login: called");
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginBody { email, senha: password })
            .send()
            .await?;
        let credentials: Credentials = parse_json(response).await?;
        if credentials.token.is_empty() {
            return Err(ClientError::NotAuthenticated);
        }
        info!(%email, "Logged in");
        Ok(credentials)
    }

    /// Create an account; the response body is not used
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ClientError> {
        debug!(%email, "register: called");
        let response = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&RegisterBody {
                nome: name,
                email,
                senha: password,
            })
            .send()
            .await?;
        let _: serde_json::Value = parse_json(response).await?;
        info!(%email, "Account registered");
        Ok(())
    }
}

/// Credentials persisted between runs
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.token_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved credentials, `None` when nobody is logged in
    pub fn load(&self) -> Result<Option<Credentials>> {
        debug!(path = %self.path.display(), "load: called");
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let credentials = serde_json::from_str(&content)
            .context(format!("Corrupt session file {}; run `an logout`", self.path.display()))?;
        Ok(Some(credentials))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        debug!(path = %self.path.display(), "save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        write_private(&self.path, content.as_bytes()).context("Failed to write session file")?;
        Ok(())
    }

    /// Forget the session; true when there was one
    pub fn clear(&self) -> Result<bool> {
        debug!(path = %self.path.display(), "clear: called");
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove session file")?;
        Ok(true)
    }
}

/// Write a file only the owner can read
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // mode() only applies on create; tighten files left by older versions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content)
}
