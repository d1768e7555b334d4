use crate::codegen::{DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Longest code length accepted from configuration.
const MAX_CODE_LENGTH: usize = 64;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on. Also used in short URLs when a request carries no
    /// Host header.
    pub port: u16,

    /// Path of the SQLite database file, e.g. "./urls.db"
    pub storage_path: PathBuf,

    /// Number of characters in generated short codes
    pub code_length: usize,

    /// Upper bound on collision retries for a single code
    pub max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            storage_path: PathBuf::from("urls.db"),
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset keys fall
    /// back to [`AppConfig::default`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(v) => v
                .parse::<u16>()
                .context("PORT must be a valid port number (1–65535)")?,
            None => defaults.port,
        };

        let code_length = match lookup("CODE_LENGTH") {
            Some(v) => v
                .parse::<usize>()
                .context("CODE_LENGTH must be a positive integer")?,
            None => defaults.code_length,
        };
        if code_length == 0 || code_length > MAX_CODE_LENGTH {
            anyhow::bail!("CODE_LENGTH must be between 1 and {MAX_CODE_LENGTH}");
        }

        let max_attempts = match lookup("CODE_MAX_ATTEMPTS") {
            Some(v) => v
                .parse::<u32>()
                .context("CODE_MAX_ATTEMPTS must be a positive integer")?,
            None => defaults.max_attempts,
        };
        if max_attempts == 0 {
            anyhow::bail!("CODE_MAX_ATTEMPTS must be at least 1");
        }

        let storage_path = lookup("DATABASE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            storage_path,
            code_length,
            max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.storage_path, PathBuf::from("urls.db"));
        assert_eq!(config.code_length, 6);
        assert_eq!(config.max_attempts, 1000);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("DATABASE_PATH", "/tmp/links.db"),
            ("CODE_LENGTH", "8"),
            ("CODE_MAX_ATTEMPTS", "5"),
        ])
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/links.db"));
        assert_eq!(config.code_length, 8);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("PORT", "70000")]).is_err());
        assert!(load(&[("CODE_LENGTH", "0")]).is_err());
        assert!(load(&[("CODE_LENGTH", "65")]).is_err());
        assert!(load(&[("CODE_MAX_ATTEMPTS", "0")]).is_err());
    }
}
