//! Process configuration parsed from environment variables.
//!
//! Read once at startup. Any error here is fatal: `main` logs it and exits
//! nonzero before the listener is bound.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    Missing(&'static str),
    #[error("{var} is set but {missing} is not")]
    Incomplete { var: &'static str, missing: &'static str },
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("failed to load .env: {0}")]
    DotEnv(String),
}

/// Load `.env` into the process environment if one exists.
///
/// # Errors
///
/// Returns [`ConfigError::DotEnv`] if the file exists but cannot be read or parsed.
pub fn load_dotenv() -> Result<(), ConfigError> {
    dotenv_outcome(dotenvy::dotenv().map(|_| ()))
}

/// A missing `.env` is normal in deployed environments; anything else is fatal.
fn dotenv_outcome(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e.to_string())),
    }
}

/// Where auto-reply records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatastoreConfig {
    /// Direct `PostgreSQL` connection.
    Postgres { database_url: String, max_connections: u32 },
    /// Hosted PostgREST endpoint (Supabase).
    Rest { base_url: String, api_key: String },
}

impl DatastoreConfig {
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Rest { .. } => "supabase",
        }
    }
}

/// Bounds applied to every outbound datastore and webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl UpstreamTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for UpstreamTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS, connect_secs: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub datastore: DatastoreConfig,
    pub webhook_url: String,
    pub port: u16,
    pub timeouts: UpstreamTimeouts,
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`, or both `SUPABASE_URL` and `SUPABASE_KEY`
    /// - `N8N_WEBHOOK_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3001
    /// - `UPSTREAM_TIMEOUT_SECS`: default 15
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 5
    /// - `DB_MAX_CONNECTIONS`: default 5
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let datastore = match (get("DATABASE_URL"), get("SUPABASE_URL"), get("SUPABASE_KEY")) {
            (Some(database_url), _, _) => DatastoreConfig::Postgres {
                database_url,
                max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            },
            (None, Some(url), Some(api_key)) => {
                let base_url = parse_http_url("SUPABASE_URL", &url)?.trim_end_matches('/').to_string();
                DatastoreConfig::Rest { base_url, api_key }
            }
            (None, Some(_), None) => {
                return Err(ConfigError::Incomplete { var: "SUPABASE_URL", missing: "SUPABASE_KEY" });
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::Incomplete { var: "SUPABASE_KEY", missing: "SUPABASE_URL" });
            }
            (None, None, None) => return Err(ConfigError::Missing("DATABASE_URL or SUPABASE_URL")),
        };

        let webhook_raw = get("N8N_WEBHOOK_URL").ok_or(ConfigError::Missing("N8N_WEBHOOK_URL"))?;
        let webhook_url = parse_http_url("N8N_WEBHOOK_URL", &webhook_raw)?;

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let timeouts = UpstreamTimeouts {
            request_secs: parse_or(get("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?,
            connect_secs: parse_or(
                get("UPSTREAM_CONNECT_TIMEOUT_SECS"),
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
            )?,
        };
        if timeouts.request_secs == 0 {
            return Err(ConfigError::Invalid { var: "UPSTREAM_TIMEOUT_SECS", reason: "must be positive".into() });
        }
        if timeouts.connect_secs == 0 {
            return Err(ConfigError::Invalid { var: "UPSTREAM_CONNECT_TIMEOUT_SECS", reason: "must be positive".into() });
        }

        Ok(Self { datastore, webhook_url, port, timeouts })
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid { var, reason: format!("{v:?}: {e}") }),
    }
}

fn parse_http_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw).map_err(|e| ConfigError::Invalid { var, reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid { var, reason: format!("unsupported scheme '{}'", url.scheme()) });
    }
    Ok(raw.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
