// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] struct built once at startup. The config is shared through
//! [`crate::state::AppState`]; nothing reads the environment after startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `JWT_SECRET` | HMAC key used to sign access tokens (>= 32 bytes) | Required |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | Access token lifetime | `30` |
//! | `BCRYPT_COST` | bcrypt work factor (4..=31) | `12` |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origins | `http://localhost:3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |

use std::fmt;
use std::path::PathBuf;

use chrono::Duration;

/// Environment variable name for the server bind host.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The redb database file `mission-control.redb` is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the access token lifetime in minutes.
pub const TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";

/// Environment variable name for the bcrypt cost factor.
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";

/// Environment variable name for the CORS origin allow-list.
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable names for optional TLS material.
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "mission-control.redb";

/// Minimum accepted length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Secret used when the `dev` feature is enabled and `JWT_SECRET` is unset.
#[cfg(feature = "dev")]
const DEV_JWT_SECRET: &str = "mission-control-development-secret-do-not-deploy";

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// HMAC signing secret. Redacted from `Debug` output.
#[derive(Clone)]
pub struct JwtSecret(String);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(**redacted**)")
    }
}

/// Certificate and key paths for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Process-wide configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: JwtSecret,
    pub access_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.into()));

        let jwt_secret = match get(JWT_SECRET_ENV) {
            Some(secret) => secret,
            None => dev_secret().ok_or(ConfigError::Missing(JWT_SECRET_ENV))?,
        };
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let ttl_minutes = match get(TOKEN_TTL_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    var: TOKEN_TTL_ENV,
                    reason: format!("'{raw}' is not a positive number of minutes"),
                })?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let bcrypt_cost = match get(BCRYPT_COST_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| ConfigError::Invalid {
                    var: BCRYPT_COST_ENV,
                    reason: format!("'{raw}' is not a cost between 4 and 31"),
                })?,
            None => bcrypt::DEFAULT_COST,
        };

        let allowed_origins = parse_origins(
            &get(ALLOWED_ORIGINS_ENV).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        )?;

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None => LogFormat::default(),
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(raw) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV,
                    reason: format!("'{raw}' is not 'json' or 'pretty'"),
                })
            }
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret: JwtSecret::new(jwt_secret),
            access_token_ttl: Duration::minutes(ttl_minutes),
            bcrypt_cost,
            allowed_origins,
            log_format,
            tls,
        })
    }

    /// Full path of the redb database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(feature = "dev")]
fn dev_secret() -> Option<String> {
    tracing::warn!("JWT_SECRET not set, using the built-in development secret");
    Some(DEV_JWT_SECRET.to_string())
}

#[cfg(not(feature = "dev"))]
fn dev_secret() -> Option<String> {
    None
}

/// Parse and validate a comma-separated origin list.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let url = url::Url::parse(origin).map_err(|e| ConfigError::Invalid {
                var: ALLOWED_ORIGINS_ENV,
                reason: format!("'{origin}': {e}"),
            })?;
            match url.scheme() {
                "http" | "https" => Ok(url.origin().ascii_serialization()),
                other => Err(ConfigError::Invalid {
                    var: ALLOWED_ORIGINS_ENV,
                    reason: format!("'{origin}': unsupported scheme '{other}'"),
                }),
            }
        })
        .collect()
}
