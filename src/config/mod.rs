use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which document store backs the listing queries and application writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process-local store, optionally seeded from a JSON file of collections.
    Memory { seed_path: Option<PathBuf> },
    /// Hosted Firestore database reached through its REST API.
    Firestore(FirestoreSettings),
}

/// Connection settings for the hosted Firestore project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());

        match backend.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory {
                seed_path: env::var("STORE_SEED_PATH").ok().map(PathBuf::from),
            }),
            "firestore" => {
                let project_id = env::var("FIRESTORE_PROJECT_ID")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .ok_or(ConfigError::MissingProjectId)?;
                let api_key = env::var("FIRESTORE_API_KEY")
                    .ok()
                    .filter(|value| !value.trim().is_empty());
                let base_url = env::var("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_FIRESTORE_BASE_URL.to_string());

                Ok(Self::Firestore(FirestoreSettings {
                    project_id,
                    api_key,
                    base_url,
                }))
            }
            other => Err(ConfigError::UnknownStoreBackend(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownStoreBackend(String),
    MissingProjectId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownStoreBackend(value) => {
                write!(f, "STORE_BACKEND must be 'memory' or 'firestore' (found '{value}')")
            }
            ConfigError::MissingProjectId => {
                write!(f, "FIRESTORE_PROJECT_ID is required when STORE_BACKEND=firestore")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownStoreBackend(_)
            | ConfigError::MissingProjectId => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "STORE_BACKEND",
            "STORE_SEED_PATH",
            "FIRESTORE_PROJECT_ID",
            "FIRESTORE_API_KEY",
            "FIRESTORE_BASE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.store, StoreConfig::Memory { seed_path: None });
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn firestore_backend_requires_project_id() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STORE_BACKEND", "firestore");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::MissingProjectId)
        ));

        env::set_var("FIRESTORE_PROJECT_ID", "hipop-markets");
        env::set_var("FIRESTORE_API_KEY", "test-key");
        let config = AppConfig::load().expect("firestore config loads");
        assert_eq!(
            config.store,
            StoreConfig::Firestore(FirestoreSettings {
                project_id: "hipop-markets".to_string(),
                api_key: Some("test-key".to_string()),
                base_url: DEFAULT_FIRESTORE_BASE_URL.to_string(),
            })
        );
        reset_env();
    }

    #[test]
    fn rejects_unknown_backend() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STORE_BACKEND", "postgres");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::UnknownStoreBackend(value)) if value == "postgres"
        ));
        reset_env();
    }
}
