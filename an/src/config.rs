//! Anamnese configuration types and loading

use eyre::{Context, Result};
use questionnaire::QuestionSets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion provider configuration
    pub llm: LlmConfig,

    /// Gateway HTTP server configuration
    pub server: ServerConfig,

    /// Where clients reach the gateway
    pub gateway: GatewayConfig,

    /// Plan history and identity services
    pub store: StoreConfig,

    /// Question sets per category
    pub questions: QuestionSets,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Check the provider API key is available
    ///
    /// Only needed where the provider is called from this process (`serve`
    /// and local generation).
    pub fn validate_provider(&self) -> Result<()> {
        let var = self.llm.api_key_env();
        if std::env::var(var).is_err() {
            return Err(eyre::eyre!("LLM API key not found. Set the {} environment variable.", var));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        #[derive(Deserialize)]
        struct LogLevelOnly {
            #[serde(rename = "log-level")]
            log_level: Option<String>,
        }

        let path = match config_path {
            Some(path) => path.clone(),
            None => Self::default_paths().into_iter().find(|p| p.exists())?,
        };
        let content = fs::read_to_string(path).ok()?;
        serde_yaml::from_str::<LogLevelOnly>(&content).ok()?.log_level
    }

    /// Project-local `.anamnese.yml`, then `~/.config/anamnese/anamnese.yml`
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".anamnese.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("anamnese").join("anamnese.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Completion provider configuration
///
/// `model`, `api-key-env` and `base-url` fall back to the selected
/// provider's defaults when left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Provider request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

/// Built-in settings for a known provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub model: &'static str,
    pub api_key_env: &'static str,
    pub base_url: &'static str,
}

const OPENAI_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "gpt-4",
    api_key_env: "OPENAI_API_KEY",
    base_url: "https://api.openai.com",
};

const ANTHROPIC_DEFAULTS: ProviderDefaults = ProviderDefaults {
    model: "claude-sonnet-4-20250514",
    api_key_env: "ANTHROPIC_API_KEY",
    base_url: "https://api.anthropic.com",
};

impl ProviderDefaults {
    /// Defaults for `provider`; unknown names get the OpenAI ones and are
    /// rejected later by `create_client`
    pub fn for_provider(provider: &str) -> Self {
        match provider {
            "anthropic" => ANTHROPIC_DEFAULTS,
            _ => OPENAI_DEFAULTS,
        }
    }
}

impl LlmConfig {
    fn defaults(&self) -> ProviderDefaults {
        ProviderDefaults::for_provider(&self.provider)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.defaults().model)
    }

    /// Name of the environment variable holding the API key
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.defaults().api_key_env)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.defaults().base_url)
    }

    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        let var = self.api_key_env();
        std::env::var(var).map_err(|_| eyre::eyre!("Environment variable {} is not set", var))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Gateway HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Origin allowed by CORS (the web front end)
    #[serde(rename = "allowed-origin")]
    pub allowed_origin: String,

    /// Upper bound on one generation, provider call included
    #[serde(rename = "generate-timeout-ms")]
    pub generate_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
            allowed_origin: "http://localhost:5173".to_string(),
            generate_timeout_ms: 120_000,
        }
    }
}

/// How clients reach the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway base URL
    pub url: String,

    /// Client request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3001".to_string(),
            timeout_ms: 130_000,
        }
    }
}

/// Plan history and identity service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the plan history / auth API
    pub url: String,

    /// File holding the bearer token
    #[serde(rename = "token-file")]
    pub token_file: PathBuf,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let token_file = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("anamnese")
            .join("session.json");

        Self {
            url: "http://localhost:3001".to_string(),
            token_file,
            timeout_ms: 30_000,
        }
    }
}
