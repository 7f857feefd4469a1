//! Runtime configuration of the backend server.
//!
//! Values are read from the process environment once at startup. A `.env`
//! file in the working directory is loaded first, so local overrides do not
//! need to be exported in the shell.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::job_controller::state::DEFAULT_RETENTION;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB: &str = "prompthub.sqlite";
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `PROMPTHUB_HOST`
    pub host: String,
    /// `PROMPTHUB_PORT`
    pub port: u16,
    /// `PROMPTHUB_DB`, path of the SQLite database file.
    pub database_path: PathBuf,
    /// `PROMPTHUB_JSON_LIMIT`, maximum accepted JSON body size in bytes.
    pub json_limit: usize,
    /// `PROMPTHUB_TASK_RETENTION_SECS`, how long finished debug tasks stay
    /// readable before they are pruned.
    pub task_retention: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB),
            json_limit: DEFAULT_JSON_LIMIT,
            task_retention: DEFAULT_RETENTION,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if any) and builds the configuration from the environment.
    pub fn load() -> Result<Self, String> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(format!("could not read .env: {}", err));
            }
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PROMPTHUB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("invalid PROMPTHUB_PORT '{}': {}", raw, e))?,
            None => defaults.port,
        };
        let json_limit = match lookup("PROMPTHUB_JSON_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid PROMPTHUB_JSON_LIMIT '{}': {}", raw, e))?,
            None => defaults.json_limit,
        };
        let task_retention = match lookup("PROMPTHUB_TASK_RETENTION_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| format!("invalid PROMPTHUB_TASK_RETENTION_SECS '{}': {}", raw, e))?,
            None => defaults.task_retention,
        };

        Ok(Self {
            host: lookup("PROMPTHUB_HOST").unwrap_or(defaults.host),
            port,
            database_path: lookup("PROMPTHUB_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            json_limit,
            task_retention,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).expect("config");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("PROMPTHUB_HOST", "0.0.0.0"),
            ("PROMPTHUB_PORT", "9090"),
            ("PROMPTHUB_DB", "/tmp/hub.sqlite"),
            ("PROMPTHUB_TASK_RETENTION_SECS", "30"),
        ]
        .into_iter()
        .collect();
        let config =
            AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("config");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, PathBuf::from("/tmp/hub.sqlite"));
        assert_eq!(config.task_retention, Duration::from_secs(30));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_lookup(|name| {
            (name == "PROMPTHUB_PORT").then(|| "eighty".to_string())
        })
        .expect_err("port should not parse");
        assert!(err.contains("PROMPTHUB_PORT"), "{err}");
    }
}
