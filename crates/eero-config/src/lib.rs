//! Configuration for the eero CLI.
//!
//! TOML config file plus `EERO_`-prefixed environment overrides (figment),
//! platform paths (directories), credential-store selection between the
//! session file and the OS keyring, and translation to `eero_api::ApiConfig`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use eero_api::{
    ApiConfig, CredentialStore, DEFAULT_API_URL, FileCredentialStore, RetryPolicy, TransportConfig,
};

const KEYRING_SERVICE: &str = "eero";
const KEYRING_ENTRY: &str = "session-token";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Where the session token is persisted between runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CredentialBackend {
    /// JSON session file in the platform data directory.
    #[default]
    File,
    /// OS secret store (Keychain, Secret Service, Credential Manager).
    Keyring,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Network used when a command is not given `--network`.
    pub default_network: Option<String>,

    /// Versioned API root.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub credential_store: CredentialBackend,

    /// Override for the session file location.
    pub session_file: Option<PathBuf>,

    /// Lifetime of cached read responses. `0` disables the cache.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_network: None,
            api_url: default_api_url(),
            credential_store: CredentialBackend::default(),
            session_file: None,
            cache_ttl_secs: default_cache_ttl(),
            timeout_secs: default_timeout(),
            retry: RetrySettings::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    /// Total attempts for idempotent calls, first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_cache_ttl() -> u64 {
    60
}
fn default_timeout() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    250
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api_url).map_err(|e| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("{e}: {}", self.api_url),
        })?;
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation {
                field: "retry.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Session file in use: the configured override or the platform default.
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(default_session_path)
    }

    /// Pipeline settings derived from this config.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            transport: TransportConfig::default()
                .with_timeout(Duration::from_secs(self.timeout_secs)),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            retry: RetryPolicy::new(
                self.retry.max_attempts,
                Duration::from_millis(self.retry.base_delay_ms),
            ),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "eero", "eero")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("eero");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted session token.
pub fn default_session_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EERO_").split("__"))
        .extract()?;
    config.validate()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load only the TOML file at `path`, without environment overrides.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Read-modify-write the canonical config file. Environment overrides are
/// not written back.
pub fn update_config(edit: impl FnOnce(&mut Config)) -> Result<Config, ConfigError> {
    update_config_at(&config_path(), edit)
}

pub fn update_config_at(
    path: &Path,
    edit: impl FnOnce(&mut Config),
) -> Result<Config, ConfigError> {
    let mut cfg = load_config_file(path)?;
    edit(&mut cfg);
    cfg.validate()?;
    save_config_to(&cfg, path)?;
    Ok(cfg)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credential store selection ──────────────────────────────────────

/// Session token kept in the OS secret store.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    user: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ENTRY)
    }
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, eero_api::Error> {
        keyring::Entry::new(&self.service, &self.user).map_err(keyring_error)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, eero_api::Error> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), eero_api::Error> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(keyring_error)
    }

    fn clear(&self) -> Result<(), eero_api::Error> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

fn keyring_error(err: keyring::Error) -> eero_api::Error {
    eero_api::Error::CredentialStore {
        message: format!("keyring: {err}"),
    }
}

/// Build the credential store `backend` selects.
pub fn open_credential_store(cfg: &Config, backend: CredentialBackend) -> Arc<dyn CredentialStore> {
    match backend {
        CredentialBackend::File => Arc::new(FileCredentialStore::new(cfg.session_path())),
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::default()),
    }
}
