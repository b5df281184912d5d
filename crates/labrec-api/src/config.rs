//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration for local development. `.env` is loaded by `main` before
//! [`ApiConfig::from_env`] runs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use labrec_core::{parse_utc_offset, Error, Result};
use labrec_db::pool::{PoolConfig, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS};

/// Where uploaded literature files are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Local directory. Env: `UPLOAD_DIR` (default `uploads/literature`).
    Filesystem { upload_dir: PathBuf },
    /// External bucket over HTTP.
    /// Env: `OBJECT_STORE_ENDPOINT`, `OBJECT_STORE_BUCKET`,
    /// `OBJECT_STORE_TOKEN`, `OBJECT_STORE_PUBLIC_URL`.
    Object {
        endpoint: String,
        bucket: String,
        token: Option<String>,
        public_url: Option<String>,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Env: `DATABASE_URL`. Default: `postgres://localhost/labrec`.
    pub database_url: String,

    /// Env: `HOST`. Default: `0.0.0.0`.
    pub host: String,

    /// Env: `PORT`. Default: `3000`.
    pub port: u16,

    /// Env: `DB_MAX_CONNECTIONS`. Default: `10`.
    pub db_max_connections: u32,

    /// Env: `DB_ACQUIRE_TIMEOUT_SECS`. Default: `5`.
    pub db_acquire_timeout: Duration,

    /// Apply pending migrations at startup.
    /// Env: `RUN_MIGRATIONS` (true/false). Default: `true`.
    pub run_migrations: bool,

    /// Env: `STORAGE_BACKEND` (`filesystem` | `object`). Default: `filesystem`.
    pub storage: StorageConfig,

    /// Reject attachments whose MIME type is not on the allowlist.
    /// Env: `UPLOAD_TYPE_FILTER` (true/false). Default: `true`.
    pub upload_type_filter: bool,

    /// Offset in which `getLogsByDate` interprets calendar days.
    /// Env: `LOG_DAY_UTC_OFFSET` (e.g. `+08:00`). Default: `+00:00`.
    pub log_day_offset: FixedOffset,

    /// CORS origins. `None` allows any origin.
    /// Env: `ALLOWED_ORIGINS` (comma-separated, `*` or unset for any).
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/labrec".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            db_acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            run_migrations: true,
            storage: StorageConfig::Filesystem {
                upload_dir: PathBuf::from("uploads/literature"),
            },
            upload_type_filter: true,
            log_day_offset: utc(),
            allowed_origins: None,
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `ALLOWED_ORIGINS`. Empty or `*` means any origin.
pub fn parse_allowed_origins(value: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        None
    } else {
        Some(origins)
    }
}

impl ApiConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or invalid values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => config.port = p,
                Err(_) => tracing::warn!(value = %port, "Invalid PORT, using default"),
            }
        }

        if let Some(n) = lookup("DB_MAX_CONNECTIONS") {
            match n.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.db_max_connections = n,
                _ => tracing::warn!(value = %n, "Invalid DB_MAX_CONNECTIONS, using default"),
            }
        }

        if let Some(secs) = lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(s) if s > 0 => config.db_acquire_timeout = Duration::from_secs(s),
                _ => tracing::warn!(
                    value = %secs,
                    "Invalid DB_ACQUIRE_TIMEOUT_SECS, using default"
                ),
            }
        }

        if let Some(val) = lookup("RUN_MIGRATIONS") {
            match parse_flag(&val) {
                Some(flag) => config.run_migrations = flag,
                None => tracing::warn!(value = %val, "Invalid RUN_MIGRATIONS, using default"),
            }
        }

        if let Some(val) = lookup("UPLOAD_TYPE_FILTER") {
            match parse_flag(&val) {
                Some(flag) => config.upload_type_filter = flag,
                None => tracing::warn!(value = %val, "Invalid UPLOAD_TYPE_FILTER, using default"),
            }
        }

        if let Some(val) = lookup("LOG_DAY_UTC_OFFSET") {
            match parse_utc_offset(&val) {
                Some(offset) => config.log_day_offset = offset,
                None => tracing::warn!(value = %val, "Invalid LOG_DAY_UTC_OFFSET, using +00:00"),
            }
        }

        if let Some(val) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_allowed_origins(&val);
        }

        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "filesystem".to_string());
        config.storage = match backend.trim().to_ascii_lowercase().as_str() {
            "object" | "bucket" => {
                let endpoint = lookup("OBJECT_STORE_ENDPOINT")
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| {
                        Error::Config(
                            "OBJECT_STORE_ENDPOINT is required when STORAGE_BACKEND=object"
                                .to_string(),
                        )
                    })?;
                StorageConfig::Object {
                    endpoint,
                    bucket: lookup("OBJECT_STORE_BUCKET")
                        .unwrap_or_else(|| "literature".to_string()),
                    token: lookup("OBJECT_STORE_TOKEN").filter(|t| !t.is_empty()),
                    public_url: lookup("OBJECT_STORE_PUBLIC_URL").filter(|u| !u.is_empty()),
                }
            }
            "filesystem" | "fs" | "local" => StorageConfig::Filesystem {
                upload_dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("uploads/literature")),
            },
            other => {
                return Err(Error::Config(format!(
                    "unknown STORAGE_BACKEND '{}', expected 'filesystem' or 'object'",
                    other
                )))
            }
        };

        Ok(config)
    }

    /// Pool sizing for [`labrec_db::Database::open`].
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout)
    }

    /// `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.run_migrations);
        assert!(config.upload_type_filter);
        assert_eq!(config.log_day_offset.local_minus_utc(), 0);
        assert!(config.allowed_origins.is_none());
        assert_eq!(
            config.storage,
            StorageConfig::Filesystem {
                upload_dir: PathBuf::from("uploads/literature")
            }
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(&[
            ("PORT", "not-a-port"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "soon"),
            ("UPLOAD_TYPE_FILTER", "maybe"),
            ("LOG_DAY_UTC_OFFSET", "tomorrow"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(5));
        assert!(config.upload_type_filter);
        assert_eq!(config.log_day_offset.local_minus_utc(), 0);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("UPLOAD_TYPE_FILTER", "false"),
            ("RUN_MIGRATIONS", "0"),
            ("LOG_DAY_UTC_OFFSET", "+08:00"),
            ("UPLOAD_DIR", "/srv/files"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.upload_type_filter);
        assert!(!config.run_migrations);
        assert_eq!(config.log_day_offset.local_minus_utc(), 8 * 3600);
        assert_eq!(
            config.storage,
            StorageConfig::Filesystem {
                upload_dir: PathBuf::from("/srv/files")
            }
        );
    }

    #[test]
    fn test_pool_config_follows_env() {
        let config = load(&[
            ("DB_MAX_CONNECTIONS", "25"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(
            config.pool_config(),
            PoolConfig::new()
                .max_connections(25)
                .acquire_timeout(Duration::from_secs(30))
        );
        assert_eq!(load(&[]).unwrap().pool_config(), PoolConfig::default());
    }

    #[test]
    fn test_object_storage_requires_endpoint() {
        assert!(load(&[("STORAGE_BACKEND", "object")]).is_err());

        let config = load(&[
            ("STORAGE_BACKEND", "object"),
            ("OBJECT_STORE_ENDPOINT", "https://store.example.com"),
            ("OBJECT_STORE_TOKEN", "t0ken"),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Object {
                endpoint: "https://store.example.com".to_string(),
                bucket: "literature".to_string(),
                token: Some("t0ken".to_string()),
                public_url: None,
            }
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(load(&[("STORAGE_BACKEND", "ftp")]).is_err());
    }

    #[test]
    fn test_allowed_origins_parsing() {
        assert_eq!(parse_allowed_origins(""), None);
        assert_eq!(parse_allowed_origins("*"), None);
        assert_eq!(
            parse_allowed_origins("http://localhost:5173, https://lab.example.com ,"),
            Some(vec![
                "http://localhost:5173".to_string(),
                "https://lab.example.com".to_string()
            ])
        );
    }
}
