use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Startup configuration errors. Any of these aborts the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Carries credentials; never serialized
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    /// Path prefixes that bypass the authentication gate
    pub public_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Base64 encoded HMAC secret for session tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub firebase_project_id: String,
    pub jwks_url: String,
    pub jwks_cache_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub upcoming_limit: usize,
}

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

impl AppConfig {
    /// Build configuration from the process environment and check required values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Profile defaults plus environment overrides, without the required-value check.
    /// Callers that apply further overrides must call `validate` themselves.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v.trim().to_string();
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Store overrides
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.store.database_url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.store.connection_timeout = v.parse().unwrap_or(self.store.connection_timeout);
        }

        // API overrides
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Identity provider overrides
        if let Ok(v) = env::var("FIREBASE_PROJECT_ID") {
            self.identity.firebase_project_id = v.trim().to_string();
        }
        if let Ok(v) = env::var("FIREBASE_JWKS_URL") {
            self.identity.jwks_url = v;
        }

        if let Ok(v) = env::var("TIMELINE_UPCOMING_LIMIT") {
            self.timeline.upcoming_limit = v.parse().unwrap_or(self.timeline.upcoming_limit);
        }

        Ok(self)
    }

    /// Required settings: signing secret, identity provider audience and, for the
    /// Postgres backend, the connection string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.identity.firebase_project_id.is_empty() {
            return Err(ConfigError::Missing("FIREBASE_PROJECT_ID"));
        }
        if self.store.backend == StoreBackend::Postgres
            && self.store.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB, pet images travel inline
                public_prefixes: default_public_prefixes(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
            identity: IdentityConfig {
                firebase_project_id: String::new(),
                jwks_url: DEFAULT_JWKS_URL.to_string(),
                jwks_cache_secs: 3600,
            },
            timeline: TimelineConfig { upcoming_limit: 5 },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.store.max_connections = 20;
        config.store.connection_timeout = 10;
        config.api.max_request_size_bytes = 5 * 1024 * 1024;
        config.security.cors_origins = vec!["https://staging.furr-ever-care.vercel.app".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.store.max_connections = 50;
        config.store.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 5 * 1024 * 1024;
        config.security.cors_origins = vec!["https://furr-ever-care.vercel.app".to_string()];
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn default_public_prefixes() -> Vec<String> {
    vec!["/api/auth/".to_string(), "/health".to_string()]
}
