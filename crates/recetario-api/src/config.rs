//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/recetario` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000,http://localhost:5173` |
//! | `IDENTITY_HEADER` | `x-user-id` |
//! | `MAX_BODY_BYTES` | `1048576` |

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use recetario_db::pool::DEFAULT_MAX_CONNECTIONS;
use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/recetario";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub allowed_origins: Vec<HeaderValue>,
    /// Header carrying the caller's user id, set by the upstream gateway.
    pub identity_header: HeaderName,
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT);
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            lookup("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        );
        let max_body_bytes = parse_or(
            "MAX_BODY_BYTES",
            lookup("MAX_BODY_BYTES"),
            DEFAULT_MAX_BODY_BYTES,
        );
        let allowed_origins =
            parse_allowed_origins(lookup("ALLOWED_ORIGINS").as_deref().unwrap_or(""));
        let identity_header = lookup("IDENTITY_HEADER")
            .and_then(|raw| match raw.trim().to_lowercase().parse::<HeaderName>() {
                Ok(name) => Some(name),
                Err(e) => {
                    warn!("Invalid IDENTITY_HEADER '{}': {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(|| HeaderName::from_static(DEFAULT_IDENTITY_HEADER));

        Self {
            database_url,
            host,
            port,
            db_max_connections,
            allowed_origins,
            identity_header,
            max_body_bytes,
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', using default", key, value);
            default
        }),
    }
}

/// Comma-separated CORS origins. Invalid entries are skipped; an empty
/// setting uses the local development defaults.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    if origins.trim().is_empty() {
        return DEFAULT_ALLOWED_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect();
    }

    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
