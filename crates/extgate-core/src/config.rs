//! Configuration module
//!
//! Server, store and upload-policy settings loaded from the environment.

use std::env;

use crate::constants::{
    DEFAULT_FIXED_EXTENSIONS, DEFAULT_FIXED_EXTENSIONS_BLOCKED, DEFAULT_MAX_FILE_SIZE_MB,
};
use crate::extension::normalize_extension;
use crate::storage_types::{StorageBackend, StoreBackend};

// Common constants
const SERVER_HOST: &str = "0.0.0.0";
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const LOCAL_STORAGE_PATH: &str = "./uploads";

/// Server settings shared by every deployment
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Gatekeeper configuration
#[derive(Clone, Debug)]
pub struct GatekeeperConfig {
    pub base: BaseConfig,
    // Policy/file/audit store
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Blob storage
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    // Upload policy
    pub max_file_size_bytes: usize,
    pub fixed_extensions: Vec<String>,
    pub fixed_extensions_blocked: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GatekeeperConfig>);

impl Config {
    fn as_gatekeeper(&self) -> &GatekeeperConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_gatekeeper().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GatekeeperConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gatekeeper().validate()
    }

    pub fn server_host(&self) -> &str {
        &self.as_gatekeeper().base.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.as_gatekeeper().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gatekeeper().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_gatekeeper().base.environment
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.as_gatekeeper().store_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_gatekeeper().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_gatekeeper().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_gatekeeper().db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_gatekeeper().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_gatekeeper().local_storage_path
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_gatekeeper().max_file_size_bytes
    }

    pub fn fixed_extensions(&self) -> &[String] {
        &self.as_gatekeeper().fixed_extensions
    }

    /// Seed rows for the fixed vocabulary: `(extension, blocked)` pairs.
    pub fn fixed_extension_seed(&self) -> Vec<(String, bool)> {
        let config = self.as_gatekeeper();
        config
            .fixed_extensions
            .iter()
            .map(|ext| (ext.clone(), config.fixed_extensions_blocked.contains(ext)))
            .collect()
    }
}

impl GatekeeperConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::Postgres,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let base = BaseConfig {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            server_port: lookup("SERVER_PORT")
                .or_else(|| lookup("PORT"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(SERVER_PORT),
            cors_origins,
            environment,
        };

        Ok(GatekeeperConfig {
            base,
            store_backend,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            max_file_size_bytes: max_file_size_mb.saturating_mul(1024 * 1024),
            fixed_extensions: parse_extension_list(
                &lookup("FIXED_EXTENSIONS").unwrap_or_else(|| DEFAULT_FIXED_EXTENSIONS.to_string()),
            ),
            fixed_extensions_blocked: parse_extension_list(
                &lookup("FIXED_EXTENSIONS_BLOCKED")
                    .unwrap_or_else(|| DEFAULT_FIXED_EXTENSIONS_BLOCKED.to_string()),
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.fixed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "FIXED_EXTENSIONS must name at least one extension"
            ));
        }

        if let Some(unknown) = self
            .fixed_extensions_blocked
            .iter()
            .find(|ext| !self.fixed_extensions.contains(ext))
        {
            return Err(anyhow::anyhow!(
                "FIXED_EXTENSIONS_BLOCKED contains '{}' which is not in FIXED_EXTENSIONS",
                unknown
            ));
        }

        if self.store_backend == StoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using the postgres store backend"
                    ))
                }
                Some(url)
                    if !url.starts_with("postgres://") && !url.starts_with("postgresql://") =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        Ok(())
    }
}

/// Comma-separated list to normalized, de-duplicated tokens (order kept).
fn parse_extension_list(raw: &str) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::new();
    for ext in raw.split(',').map(normalize_extension) {
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<GatekeeperConfig, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatekeeperConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.max_file_size_bytes, 100 * 1024 * 1024);
        assert_eq!(
            config.fixed_extensions,
            vec!["bat", "cmd", "com", "cpl", "exe", "scr", "js"]
        );
        assert_eq!(config.fixed_extensions_blocked, vec!["exe"]);
        assert_eq!(config.base.server_port, 3000);
        assert_eq!(config.storage_backend, StorageBackend::Local);
        config.validate().unwrap();
    }

    #[test]
    fn test_fixed_extensions_are_normalized() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("FIXED_EXTENSIONS", " .EXE, bat,,exe "),
            ("FIXED_EXTENSIONS_BLOCKED", ".Bat"),
        ])
        .unwrap();
        assert_eq!(config.fixed_extensions, vec!["exe", "bat"]);

        let seed = Config(Box::new(config)).fixed_extension_seed();
        assert_eq!(
            seed,
            vec![("exe".to_string(), false), ("bat".to_string(), true)]
        );
    }

    #[test]
    fn test_invalid_file_size_falls_back() {
        let config =
            config_from(&[("STORE_BACKEND", "memory"), ("MAX_FILE_SIZE_MB", "lots")]).unwrap();
        assert_eq!(config.max_file_size_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let config = config_from(&[]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[("DATABASE_URL", "postgresql://localhost/extgate")]).unwrap();
        config.validate().unwrap();

        let config = config_from(&[("DATABASE_URL", "mysql://localhost/extgate")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blocked_subset_enforced() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("FIXED_EXTENSIONS_BLOCKED", "exe,sh"),
        ])
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'sh'"));
    }

    #[test]
    fn test_production_rejects_wildcard_cors() {
        assert!(config_from(&[("ENVIRONMENT", "production")]).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(config_from(&[("STORAGE_BACKEND", "s3")]).is_err());
    }
}
