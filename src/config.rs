//! Configuration management for Dayjot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{JournalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Dayjot
///
/// Holds everything needed to construct the application context: the
/// backend endpoint, which row store to use, offline auth, AI behavior,
/// and logging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend-as-a-service endpoint and credentials
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Row store selection and history settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Authentication settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// AI pipeline settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend-as-a-service endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the project (REST, auth, and functions live below it)
    #[serde(default = "default_remote_url")]
    pub url: String,

    /// Publishable (anon) API key sent with every request
    #[serde(default = "default_anon_key")]
    pub anon_key: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_remote_url() -> String {
    "http://localhost".to_string()
}

fn default_anon_key() -> String {
    "public-anon-key".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            anon_key: default_anon_key(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl RemoteConfig {
    /// Returns `true` while the endpoint still uses the built-in placeholders
    pub fn is_placeholder(&self) -> bool {
        self.url == default_remote_url() || self.anon_key == default_anon_key()
    }
}

/// Which row store backs the session history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgREST tables of the hosted project
    #[default]
    Supabase,
    /// Local SQLite file with transactional saves
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Row store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database file for the SQLite backend (platform data dir if unset)
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,

    /// Number of recent sessions fetched for history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    20
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            sqlite_path: None,
            history_limit: default_history_limit(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Fixed user id used instead of remote sign-in (offline and local use)
    #[serde(default)]
    pub offline_user: Option<String>,
}

/// AI pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Forces mock mode on or off, overriding the persisted setting
    #[serde(default)]
    pub mock_mode: Option<bool>,

    /// Name of the edge function implementing the pipeline
    #[serde(default = "default_function_name")]
    pub function_name: String,
}

fn default_function_name() -> String {
    "ai-run-pipeline".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            mock_mode: None,
            function_name: default_function_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level for the `dayjot` target (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// an environment override holds an invalid value
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env_vars()?;
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Warn about settings that leave the app running on defaults
    ///
    /// Called once logging is initialized, since logging itself is
    /// configured from the loaded file.
    pub fn warn_on_defaults(&self, path: &str) {
        if !Path::new(path).exists() {
            tracing::warn!("Config file not found at {}, using defaults", path);
        }
        if self.store.backend == StoreBackend::Supabase && self.remote.is_placeholder() {
            tracing::warn!(
                "Backend settings missing. Set DAYJOT_SUPABASE_URL and DAYJOT_SUPABASE_PUBLISHABLE_KEY."
            );
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(JournalError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(JournalError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("DAYJOT_SUPABASE_URL") {
            self.remote.url = url;
        }

        // The publishable key takes precedence over the legacy anon key.
        if let Ok(key) = std::env::var("DAYJOT_SUPABASE_PUBLISHABLE_KEY")
            .or_else(|_| std::env::var("DAYJOT_SUPABASE_ANON_KEY"))
        {
            self.remote.anon_key = key;
        }

        if let Ok(backend) = std::env::var("DAYJOT_STORE") {
            self.store.backend = backend
                .parse()
                .map_err(|e| JournalError::Config(format!("Invalid DAYJOT_STORE: {}", e)))?;
        }

        if let Ok(db_path) = std::env::var("DAYJOT_DB") {
            self.store.sqlite_path = Some(PathBuf::from(db_path));
        }

        if let Ok(limit) = std::env::var("DAYJOT_HISTORY_LIMIT") {
            self.store.history_limit = limit.parse().map_err(|_| {
                JournalError::Config(format!("Invalid DAYJOT_HISTORY_LIMIT: {}", limit))
            })?;
        }

        if let Ok(user) = std::env::var("DAYJOT_OFFLINE_USER") {
            self.auth.offline_user = Some(user);
        }

        if let Ok(mock) = std::env::var("DAYJOT_MOCK_AI") {
            self.ai.mock_mode = Some(mock.parse().map_err(|_| {
                JournalError::Config(format!("Invalid DAYJOT_MOCK_AI: {}", mock))
            })?);
        }

        Ok(())
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.remote.anon_key.is_empty() {
            return Err(
                JournalError::Config("remote.anon_key cannot be empty".to_string()).into(),
            );
        }

        if url::Url::parse(&self.remote.url).is_err() {
            return Err(JournalError::Config(format!(
                "remote.url is not a valid URL: {}",
                self.remote.url
            ))
            .into());
        }

        if self.remote.timeout_seconds == 0 {
            return Err(JournalError::Config(
                "remote.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.store.history_limit == 0 || self.store.history_limit > 1000 {
            return Err(JournalError::Config(
                "store.history_limit must be between 1 and 1000".to_string(),
            )
            .into());
        }

        if self.ai.function_name.is_empty() {
            return Err(
                JournalError::Config("ai.function_name cannot be empty".to_string()).into(),
            );
        }

        if let Some(user) = &self.auth.offline_user {
            if user.trim().is_empty() {
                return Err(JournalError::Config(
                    "auth.offline_user cannot be blank".to_string(),
                )
                .into());
            }
        }

        Ok(())
    }
}
