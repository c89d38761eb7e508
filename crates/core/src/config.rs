//! Configuration management for docchat.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.docchat/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: prompt overrides, the config file
//! and the default document index all live under `.docchat/`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Temperature used for both the query rewrite and the answer synthesis.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Number of documents the retriever hands to the answer chain.
pub const DEFAULT_TOP_K: usize = 5;

/// Idle seconds before the web UI forgets a chat session.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docchat/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("ollama", "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature for every LLM call
    pub temperature: f32,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Document index settings
    pub retrieval: RetrievalConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub temperature: Option<f32>,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Idle time after which a chat session is dropped
    #[serde(rename = "sessionTtlSecs")]
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Materialized JSONL index; relative paths resolve against the workspace
    #[serde(rename = "indexPath")]
    pub index_path: Option<PathBuf>,

    #[serde(rename = "topK")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    server: Option<ServerSection>,
    retrieval: Option<RetrievalSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
    #[serde(rename = "sessionTtlSecs")]
    session_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "indexPath")]
    index_path: Option<String>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            server: ServerConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the environment.
    ///
    /// Environment variables:
    /// - `DOCCHAT_WORKSPACE`: Override workspace path
    /// - `DOCCHAT_CONFIG`: Path to config file
    /// - `DOCCHAT_PROVIDER`: LLM provider
    /// - `DOCCHAT_MODEL`: Model identifier
    /// - `DOCCHAT_TEMPERATURE`: Sampling temperature
    /// - `DOCCHAT_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docchat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `DOCCHAT_WORKSPACE` and `DOCCHAT_CONFIG`.
    /// Both decide which YAML file is read.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env_path("DOCCHAT_WORKSPACE"));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        let config_file = config_file.or_else(|| env_path("DOCCHAT_CONFIG"));
        if config_file.is_some() {
            config.config_file = config_file;
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.docchat_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DOCCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCCHAT_MODEL") {
            config.model = model;
        }

        if let Ok(temperature) = std::env::var("DOCCHAT_TEMPERATURE") {
            config.temperature = temperature.parse().map_err(|_| {
                AppError::Config(format!("Invalid DOCCHAT_TEMPERATURE: {}", temperature))
            })?;
        }

        config.api_key = std::env::var("DOCCHAT_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(host) = server.host {
                result.server.host = host;
            }
            if let Some(port) = server.port {
                result.server.port = port;
            }
            if let Some(ttl) = server.session_ttl_secs {
                result.server.session_ttl_secs = ttl;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(index_path) = retrieval.index_path {
                result.retrieval.index_path = Some(PathBuf::from(index_path));
            }
            if let Some(top_k) = retrieval.top_k {
                result.retrieval.top_k = top_k;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the YAML file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docchat directory.
    pub fn docchat_dir(&self) -> PathBuf {
        self.workspace.join(".docchat")
    }

    /// Resolve the document index path.
    ///
    /// Falls back to `.docchat/index.jsonl` when nothing is configured.
    pub fn index_path(&self) -> PathBuf {
        match self.retrieval.index_path {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.docchat_dir().join("index.jsonl"),
        }
    }

    /// Get the configuration of a provider, if the YAML file declares one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Custom endpoint of the active provider.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::endpoint)
    }

    /// Resolve the API key for a provider.
    ///
    /// `DOCCHAT_API_KEY` wins, then the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider == "openai" {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;
        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if provider == "openai" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(
                "No API key found for provider openai (set DOCCHAT_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.retrieval.top_k, DEFAULT_TOP_K);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_default_index_path() {
        let config = AppConfig::default();
        assert!(config.index_path().ends_with(".docchat/index.jsonl"));
    }

    #[test]
    fn test_relative_index_path_resolves_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/docs");
        config.retrieval.index_path = Some(PathBuf::from("data/index.jsonl"));
        assert_eq!(
            config.index_path(),
            PathBuf::from("/srv/docs/data/index.jsonl")
        );
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-4o-mini".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  temperature: 0.2
  providers:
    ollama:
      endpoint: http://gpu-box:11434
      model: qwen2.5
server:
  port: 9000
  sessionTtlSecs: 600
retrieval:
  indexPath: docs/index.jsonl
  topK: 3
logging:
  level: debug
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "qwen2.5");
        assert_eq!(merged.temperature, 0.2);
        assert_eq!(merged.server.port, 9000);
        assert_eq!(merged.server.host, "127.0.0.1");
        assert_eq!(merged.server.session_ttl_secs, 600);
        assert_eq!(merged.retrieval.top_k, 3);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
        assert_eq!(merged.provider_endpoint(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn test_load_with_reads_workspace_config() {
        let temp = TempDir::new().unwrap();
        let docchat_dir = temp.path().join(".docchat");
        std::fs::create_dir_all(&docchat_dir).unwrap();
        std::fs::write(docchat_dir.join("config.yaml"), "server:\n  port: 9100\n").unwrap();

        let config = AppConfig::load_with(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_load_with_missing_workspace() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let result = AppConfig::load_with(Some(missing), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [unterminated").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        let mut config = AppConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let mut config = AppConfig::default();
        config.provider = "openai".to_string();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }
}
