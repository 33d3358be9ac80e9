// querygate-config/src/config.rs
// ============================================================================
// Module: Query Gate Configuration
// Description: Configuration types, loading, and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file resolved from an explicit path,
//! the `QUERYGATE_CONFIG` environment variable, or the default filename in
//! the working directory. Every recognized option is a named field with a
//! documented effect; out-of-range values fail validation instead of being
//! silently clamped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "querygate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "QUERYGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length for configured file paths.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Minimum allowed request body size in bytes.
pub(crate) const MIN_MAX_BODY_BYTES: usize = 1024;
/// Maximum allowed request body size in bytes.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Maximum length of a server label echoed into discovery payloads.
pub(crate) const MAX_SERVER_LABEL_LENGTH: usize = 128;
/// Default policy decision timeout in milliseconds.
pub(crate) const DEFAULT_POLICY_TIMEOUT_MS: u64 = 5_000;
/// Minimum policy decision timeout in milliseconds.
pub(crate) const MIN_POLICY_TIMEOUT_MS: u64 = 100;
/// Maximum policy decision timeout in milliseconds.
pub(crate) const MAX_POLICY_TIMEOUT_MS: u64 = 60_000;
/// Default policy decision path appended to the PDP base URL.
pub(crate) const DEFAULT_DECISION_PATH: &str = "/v1/data/querygate/allow";
/// Default maximum rows returned by a single tool call.
pub(crate) const DEFAULT_MAX_ROWS: u32 = 10_000;
/// Maximum allowed value for `database.max_rows`.
pub(crate) const MAX_MAX_ROWS: u32 = 100_000;
/// Default SQLite busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum SQLite busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Query Gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QuerygateConfig {
    /// Server transport configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Authorization gate (PDP) configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Backing database configuration.
    pub database: DatabaseConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Server transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Line-oriented JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// HTTP endpoint serving discovery and invocation.
    Http,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport used to serve requests.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport (required when `transport = "http"`).
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum allowed request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Optional label echoed into unlabeled discovery payloads.
    #[serde(default)]
    pub server_label: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            server_label: None,
        }
    }
}

/// Fail posture applied when the policy decision point is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// Treat transport failures as denial.
    #[default]
    Closed,
    /// Treat transport failures as approval.
    Open,
}

/// Authorization gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Base URL of the policy decision point.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Decision path appended to the base URL.
    #[serde(default = "default_decision_path")]
    pub decision_path: String,
    /// Decision request timeout in milliseconds.
    #[serde(default = "default_policy_timeout_ms")]
    pub timeout_ms: u64,
    /// Posture applied when the decision point cannot be reached.
    #[serde(default)]
    pub fail_mode: FailMode,
    /// Whether tool calls require an authorization decision at all.
    ///
    /// When false the gate is bypassed and every resolvable call executes.
    #[serde(default = "default_require_auth")]
    pub require_auth: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            decision_path: DEFAULT_DECISION_PATH.to_string(),
            timeout_ms: DEFAULT_POLICY_TIMEOUT_MS,
            fail_mode: FailMode::Closed,
            require_auth: true,
        }
    }
}

/// Backing database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Maximum rows returned by a single tool call.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit records.
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuditConfig {
    /// Destination for audit records.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log file path (required when `sink = "file"`).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default decision path.
fn default_decision_path() -> String {
    DEFAULT_DECISION_PATH.to_string()
}

/// Returns the default policy timeout.
const fn default_policy_timeout_ms() -> u64 {
    DEFAULT_POLICY_TIMEOUT_MS
}

/// Returns the default `require_auth` posture.
const fn default_require_auth() -> bool {
    true
}

/// Returns the default row cap.
const fn default_max_rows() -> u32 {
    DEFAULT_MAX_ROWS
}

/// Returns the default SQLite busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error while reading the config file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Semantically invalid configuration.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl QuerygateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then `QUERYGATE_CONFIG`, then
    /// `querygate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.policy.validate()?;
        self.database.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Validates server transport settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.transport == ServerTransport::Http {
            let bind = self
                .bind
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("server.bind required for http".to_string()))?;
            bind.parse::<SocketAddr>()
                .map_err(|_| ConfigError::Invalid("invalid server.bind address".to_string()))?;
        }
        if self.max_body_bytes < MIN_MAX_BODY_BYTES || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between {MIN_MAX_BODY_BYTES} and \
                 {MAX_MAX_BODY_BYTES}"
            )));
        }
        if let Some(label) = &self.server_label {
            if label.is_empty() || label.len() > MAX_SERVER_LABEL_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "server.server_label must be 1..={MAX_SERVER_LABEL_LENGTH} bytes"
                )));
            }
        }
        Ok(())
    }
}

impl PolicyConfig {
    /// Validates authorization gate settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.require_auth {
            let base_url = self.base_url.as_ref().ok_or_else(|| {
                ConfigError::Invalid("policy.base_url required when require_auth".to_string())
            })?;
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Invalid(
                    "policy.base_url must be an http(s) url".to_string(),
                ));
            }
            if !self.decision_path.starts_with('/') {
                return Err(ConfigError::Invalid(
                    "policy.decision_path must start with '/'".to_string(),
                ));
            }
        }
        if self.timeout_ms < MIN_POLICY_TIMEOUT_MS || self.timeout_ms > MAX_POLICY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "policy.timeout_ms must be between {MIN_POLICY_TIMEOUT_MS} and \
                 {MAX_POLICY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Validates database settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_file_path(&self.path, "database.path")?;
        if self.max_rows == 0 || self.max_rows > MAX_MAX_ROWS {
            return Err(ConfigError::Invalid(format!(
                "database.max_rows must be between 1 and {MAX_MAX_ROWS}"
            )));
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "database.busy_timeout_ms must not exceed {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Validates audit sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File {
            let path = self.path.as_ref().ok_or_else(|| {
                ConfigError::Invalid("audit.path required when sink = \"file\"".to_string())
            })?;
            validate_file_path(path, "audit.path")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the configuration file path from the standard sources.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(explicit) = path {
        return explicit.to_path_buf();
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR) {
        if !from_env.is_empty() {
            return PathBuf::from(from_env);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

/// Validates a configured file path against length limits.
fn validate_file_path(path: &Path, field: &str) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds maximum path length")));
    }
    Ok(())
}
