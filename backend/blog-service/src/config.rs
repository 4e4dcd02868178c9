/// Configuration management for Blog Service
///
/// Everything is read from environment variables (a `.env` file is loaded by the binary
/// before `Config::from_env` runs).
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

const DEV_SECRET_KEY: &str = "dev-secret-key-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Post list cache configuration
    pub cache: CacheConfig,
    /// Token issuing and validation
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Actix worker count
    pub workers: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min idle connections kept open
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Which store backs the per-user post list cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            "disabled" | "none" | "off" => Ok(CacheBackend::Disabled),
            other => Err(format!(
                "CACHE_BACKEND must be one of redis, memory, disabled (got '{}')",
                other
            )),
        }
    }
}

/// Post list cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Redis URL, required when the backend is `redis`
    pub redis_url: Option<String>,
    /// Lifetime of every cache write
    pub ttl_secs: u64,
    /// Upper bound on a single cache round-trip
    pub probe_timeout_ms: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Token issuing and validation settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl AuthConfig {
    /// Parsed signing algorithm. Only HMAC algorithms are accepted.
    pub fn algorithm(&self) -> Result<Algorithm, String> {
        let algorithm = Algorithm::from_str(&self.algorithm)
            .map_err(|_| format!("Unsupported ALGORITHM '{}'", self.algorithm))?;
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(format!(
                "ALGORITHM must be HS256, HS384 or HS512 (got {:?})",
                other
            )),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let config = Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8000)?,
                workers: parse_env_or_default("HTTP_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "*".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL must be set".to_string())?,
                max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env_or_default("DB_MIN_CONNECTIONS", 1)?,
                connect_timeout_secs: parse_env_or_default("DB_CONNECT_TIMEOUT_SECS", 5)?,
                acquire_timeout_secs: parse_env_or_default("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
                run_migrations: parse_env_or_default("RUN_MIGRATIONS", true)?,
            },
            cache: {
                let redis_url = std::env::var("REDIS_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty());
                let backend = match std::env::var("CACHE_BACKEND") {
                    Ok(value) => value.parse::<CacheBackend>()?,
                    Err(_) if redis_url.is_some() => CacheBackend::Redis,
                    Err(_) => CacheBackend::Disabled,
                };
                if backend == CacheBackend::Redis && redis_url.is_none() {
                    return Err("REDIS_URL must be set when CACHE_BACKEND=redis".to_string());
                }

                CacheConfig {
                    backend,
                    redis_url,
                    ttl_secs: parse_env_or_default("CACHE_TTL_SECS", crate::cache::POST_LIST_TTL_SECS)?,
                    probe_timeout_ms: parse_env_or_default("CACHE_PROBE_TIMEOUT_MS", 250)?,
                }
            },
            auth: {
                let secret_key = match std::env::var("SECRET_KEY") {
                    Ok(value) if !value.trim().is_empty() => value,
                    _ if production => {
                        return Err("SECRET_KEY must be set in production".to_string())
                    }
                    _ => DEV_SECRET_KEY.to_string(),
                };

                AuthConfig {
                    secret_key,
                    algorithm: std::env::var("ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
                    access_token_expire_minutes: parse_env_or_default(
                        "TOKEN_ACCESS_EXPIRE_MINUTES",
                        30,
                    )?,
                }
            },
        };

        config.auth.algorithm()?;
        if config.cache.ttl_secs == 0 {
            return Err("CACHE_TTL_SECS must be greater than zero".to_string());
        }
        if config.auth.access_token_expire_minutes <= 0 {
            return Err("TOKEN_ACCESS_EXPIRE_MINUTES must be greater than zero".to_string());
        }

        Ok(config)
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
