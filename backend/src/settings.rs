//! Service settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `PM_*` environment variables over the config
//! file. Accessors apply defaults so callers never see an unset field.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::{ConcurrencyPolicy, TableNames};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Length of the secret fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid concurrency policy: {0}")]
    ConcurrencyPolicy(String),
    #[error("failed to read JWT secret from {path}: {message}")]
    SecretFile { path: PathBuf, message: String },
    #[error("JWT secret is empty")]
    EmptySecret,
}

/// Configuration for the maintenance service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PM")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; documents stay in memory when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// `last_writer_wins` or `optimistic_token`.
    pub concurrency_policy: Option<String>,
    /// File holding the HS256 signing secret.
    pub jwt_secret_file: Option<PathBuf>,
    /// Inline HS256 secret, used when no secret file is configured.
    pub jwt_secret: Option<String>,
    pub configuration_table: Option<String>,
    pub preventive_tasks_table: Option<String>,
    pub mapping_table: Option<String>,
    pub calendar_table: Option<String>,
    pub customer_snapshot_table: Option<String>,
}

impl AppSettings {
    /// Parse the bind address, defaulting to `0.0.0.0:4000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::BindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            }
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn concurrency_policy(&self) -> Result<ConcurrencyPolicy, SettingsError> {
        match self.concurrency_policy.as_deref() {
            None => Ok(ConcurrencyPolicy::default()),
            Some(raw) => raw
                .parse::<ConcurrencyPolicy>()
                .map_err(SettingsError::ConcurrencyPolicy),
        }
    }

    /// Physical table names, each falling back to its default.
    pub fn table_names(&self) -> TableNames {
        let defaults = TableNames::default();
        let pick = |value: &Option<String>, default: String| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map_or(default, str::to_owned)
        };
        TableNames {
            configuration: pick(&self.configuration_table, defaults.configuration),
            preventive_tasks: pick(&self.preventive_tasks_table, defaults.preventive_tasks),
            mapping: pick(&self.mapping_table, defaults.mapping),
            calendar: pick(&self.calendar_table, defaults.calendar),
            customer_snapshot: pick(&self.customer_snapshot_table, defaults.customer_snapshot),
        }
    }

    /// Signing secret, read from `jwt_secret_file` first, then `jwt_secret`.
    ///
    /// Surrounding whitespace is stripped from file contents.
    pub fn jwt_secret(&self) -> Result<Option<Zeroizing<Vec<u8>>>, SettingsError> {
        let secret = match (&self.jwt_secret_file, &self.jwt_secret) {
            (Some(path), _) => {
                let raw = Zeroizing::new(std::fs::read(path).map_err(|err| {
                    SettingsError::SecretFile {
                        path: path.clone(),
                        message: err.to_string(),
                    }
                })?);
                Zeroizing::new(raw.trim_ascii().to_vec())
            }
            (None, Some(inline)) => Zeroizing::new(inline.as_bytes().to_vec()),
            (None, None) => return Ok(None),
        };
        if secret.is_empty() {
            return Err(SettingsError::EmptySecret);
        }
        Ok(Some(secret))
    }
}

/// Truncated SHA-256 of `secret` as lowercase hex, safe to log.
///
/// # Examples
///
/// ```
/// use switchgear_pm::settings::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"signing-secret");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
