//! Configuration surface (§6 of the design spec).
//!
//! `Config::resolve` assembles one `Config` at startup from, in increasing
//! precedence: the literal defaults below, an optional TOML file (`--config`),
//! then environment variables. Each section mirrors the teacher's per-section
//! `resolve()` convention (one struct, one `resolve`, env override over file
//! override over default).

mod helpers;

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;
use helpers::{optional_env, parse_optional_env};

/// Gateway HTTP endpoint configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/api/v0/", self.host, self.port)
    }
}

/// Bounded hand-off queue configuration.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub capacity: usize,
}

/// Dedup filter persistence configuration.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub path: PathBuf,
    pub initial_capacity: usize,
}

/// Which persistence sink backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkBackend {
    #[default]
    Postgres,
    Logging,
}

/// Persistence sink configuration.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub backend: SinkBackend,
    pub database_url: Option<SecretString>,
    pub pool_size: usize,
}

/// Top-level crawl engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub queue: QueueConfig,
    pub workers: usize,
    pub dedup: DedupConfig,
    pub request_timeout_secs: u64,
    pub sink: SinkConfig,
}

/// Shape of an optional `--config` TOML file. Every field is optional; a
/// missing file, or a missing field within a present file, simply falls
/// through to the literal default (possibly itself overridden by an env var).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    gateway_host: Option<String>,
    #[serde(default)]
    gateway_port: Option<u16>,
    #[serde(default)]
    queue_capacity: Option<usize>,
    #[serde(default)]
    workers: Option<usize>,
    #[serde(default)]
    dedup_path: Option<PathBuf>,
    #[serde(default)]
    dedup_initial_capacity: Option<usize>,
    #[serde(default)]
    request_timeout_seconds: Option<u64>,
    #[serde(default)]
    database_url: Option<String>,
    #[serde(default)]
    database_pool_size: Option<usize>,
    #[serde(default)]
    no_db: Option<bool>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Config {
    /// Resolve configuration from defaults, an optional TOML file, and the
    /// environment (environment wins). `no_db` forces the `Logging` sink
    /// backend regardless of file/env, mirroring the CLI's `--no-db` flag.
    pub fn resolve(config_path: Option<&Path>, no_db: bool) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let gateway = GatewayConfig {
            host: optional_env("GATEWAY_HOST")?
                .or(file.gateway_host.clone())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: match optional_env("GATEWAY_PORT")? {
                Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        key: "GATEWAY_PORT".to_string(),
                        message: e.to_string(),
                    }
                })?,
                None => file.gateway_port.unwrap_or(5001),
            },
        };

        let queue = QueueConfig {
            capacity: parse_optional_env(
                "QUEUE_CAPACITY",
                file.queue_capacity.unwrap_or(10),
            )?,
        };

        let workers = parse_optional_env("CRAWL_WORKERS", file.workers.unwrap_or(8))?;

        let dedup = DedupConfig {
            path: optional_env("DEDUP_PATH")?
                .map(PathBuf::from)
                .or(file.dedup_path.clone())
                .unwrap_or_else(|| PathBuf::from("/data/bloom-filter")),
            initial_capacity: parse_optional_env(
                "DEDUP_INITIAL_CAPACITY",
                file.dedup_initial_capacity.unwrap_or(100_000),
            )?,
        };

        let request_timeout_secs = parse_optional_env(
            "REQUEST_TIMEOUT_SECONDS",
            file.request_timeout_seconds.unwrap_or(60),
        )?;

        let backend = if no_db || file.no_db.unwrap_or(false) {
            SinkBackend::Logging
        } else {
            SinkBackend::default()
        };

        let database_url = optional_env("DATABASE_URL")?
            .or(file.database_url.clone())
            .map(SecretString::from);
        if backend == SinkBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingRequired {
                key: "DATABASE_URL".to_string(),
                hint: "set DATABASE_URL, pass --config, or run with --no-db".to_string(),
            });
        }

        let sink = SinkConfig {
            backend,
            database_url,
            pool_size: parse_optional_env("DATABASE_POOL_SIZE", file.database_pool_size.unwrap_or(10))?,
        };

        Ok(Config {
            gateway,
            queue,
            workers,
            dedup,
            request_timeout_secs,
            sink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_with_no_db_need_no_database_url() {
        // SAFETY: test runs single-threaded per-process env mutation is fine here.
        unsafe {
            std::env::remove_var("DATABASE_URL");
            std::env::remove_var("GATEWAY_HOST");
        }
        let config = Config::resolve(None, true).expect("resolve with --no-db");
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 5001);
        assert_eq!(config.queue.capacity, 10);
        assert_eq!(config.workers, 8);
        assert_eq!(config.dedup.path, PathBuf::from("/data/bloom-filter"));
        assert_eq!(config.sink.backend, SinkBackend::Logging);
    }

    #[test]
    fn missing_database_url_without_no_db_errors() {
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
        let err = Config::resolve(None, false).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }
}
