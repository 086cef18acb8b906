use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::retry::classify::SQL_TRANSIENT_ERROR_CODES;

/// Main configuration structure for the contact list service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub retry: RetryConfig,
    pub jwt: JwtConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: u8,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout_seconds: u64,
    pub create_timeout_seconds: u64,
    pub recycle_timeout_seconds: u64,
}

/// Retry behavior for data-access operations.
///
/// `transient_error_codes` is the set of engine error codes treated as
/// worth retrying. It defaults to the SQL transient set but can be replaced
/// wholesale for a different storage engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub exponential: bool,
    #[serde(default = "default_transient_error_codes")]
    pub transient_error_codes: Vec<i32>,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

fn default_transient_error_codes() -> Vec<i32> {
    SQL_TRANSIENT_ERROR_CODES.to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub bind: String,
    pub backend_url: String,
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Load environment variables from .env files
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        // Default config path
        let config_path = env::var("CL_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        // Load config from file if it exists
        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(name) = env::var("CL_SERVER_NAME") {
            self.server.name = name;
        }
        if let Ok(bind) = env::var("CL_HTTP_BIND") {
            self.server.bind = bind;
        }

        // Redis overrides
        if let Ok(host) = env::var("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Ok(port) = env::var("REDIS_PORT") {
            if let Ok(port_num) = port.parse() {
                self.redis.port = port_num;
            }
        }
        if let Ok(db) = env::var("REDIS_DB") {
            if let Ok(db_num) = db.parse() {
                self.redis.database = db_num;
            }
        }

        // Pool overrides
        if let Ok(pool_size) = env::var("CL_REDIS_POOL_SIZE") {
            if let Ok(size) = pool_size.parse() {
                self.redis.pool.max_size = size;
            }
        }

        // Retry overrides
        if let Ok(max_retries) = env::var("CL_RETRY_MAX_RETRIES") {
            if let Ok(max) = max_retries.parse() {
                self.retry.max_retries = max;
            }
        }
        if let Ok(delay) = env::var("CL_RETRY_BASE_DELAY_MS") {
            if let Ok(delay_ms) = delay.parse() {
                self.retry.base_delay_ms = delay_ms;
            }
        }
        if let Ok(exponential) = env::var("CL_RETRY_EXPONENTIAL") {
            if let Ok(flag) = exponential.parse() {
                self.retry.exponential = flag;
            }
        }

        // JWT overrides
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Ok(issuer) = env::var("JWT_ISSUER") {
            self.jwt.issuer = issuer;
        }
        if let Ok(audience) = env::var("JWT_AUDIENCE") {
            self.jwt.audience = audience;
        }
        if let Ok(expiration) = env::var("JWT_EXPIRATION_MINUTES") {
            if let Ok(minutes) = expiration.parse() {
                self.jwt.expiration_minutes = minutes;
            }
        }

        // Gateway overrides
        if let Ok(bind) = env::var("CL_GATEWAY_BIND") {
            self.gateway.bind = bind;
        }
        if let Ok(backend) = env::var("CL_BACKEND_URL") {
            self.gateway.backend_url = backend;
        }
        if let Ok(max_retries) = env::var("CL_GATEWAY_MAX_RETRIES") {
            if let Ok(max) = max_retries.parse() {
                self.gateway.max_retries = max;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Validate Redis configuration
        if self.redis.port == 0 {
            return Err("Redis port cannot be 0".into());
        }
        if self.redis.pool.max_size == 0 {
            return Err("Redis pool max_size cannot be 0".into());
        }

        // Validate JWT configuration
        if self.jwt.secret == "PLACEHOLDER_JWT_SECRET" || self.jwt.secret.is_empty() {
            return Err("JWT_SECRET environment variable must be set".into());
        }
        if self.jwt.secret.len() < 32 {
            return Err("JWT secret must be at least 32 bytes".into());
        }
        if self.jwt.expiration_minutes <= 0 {
            return Err("JWT expiration_minutes must be positive".into());
        }

        // Validate gateway configuration
        if !self.gateway.backend_url.starts_with("http://")
            && !self.gateway.backend_url.starts_with("https://")
        {
            return Err("Gateway backend_url must be an http(s) URL".into());
        }

        Ok(())
    }

    /// Get Redis URL with password from environment
    pub fn get_redis_url(&self) -> String {
        let password = env::var("REDIS_PASSWORD")
            .or_else(|_| env::var("REDIS_PASS"))
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "REDIS_PASSWORD not set, assuming no password for local development."
                );
                "".to_string()
            });

        if password.is_empty() {
            format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.database
            )
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.database
            )
        }
    }

    /// Get pool timeout as Duration
    pub fn get_pool_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.timeout_seconds)
    }

    /// Get pool create timeout as Duration
    pub fn get_pool_create_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.create_timeout_seconds)
    }

    /// Get pool recycle timeout as Duration
    pub fn get_pool_recycle_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.recycle_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "contact-list".to_string(),
                version: "1.2.0".to_string(),
                bind: "127.0.0.1:8080".to_string(),
            },
            redis: RedisConfig {
                host: "localhost".to_string(),
                port: 6379,
                database: 0,
                pool: PoolConfig {
                    max_size: 16,
                    timeout_seconds: 5,
                    create_timeout_seconds: 5,
                    recycle_timeout_seconds: 5,
                },
            },
            retry: RetryConfig {
                max_retries: 3,
                base_delay_ms: 1000,
                exponential: false,
                transient_error_codes: default_transient_error_codes(),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                    tracing::warn!("JWT_SECRET not set, using placeholder");
                    "PLACEHOLDER_JWT_SECRET".to_string()
                }),
                issuer: "contact-list-api".to_string(),
                audience: "contact-list-clients".to_string(),
                expiration_minutes: 60,
            },
            gateway: GatewayConfig {
                bind: "127.0.0.1:8000".to_string(),
                backend_url: "http://127.0.0.1:8080".to_string(),
                max_retries: 3,
                base_delay_ms: 2000,
            },
        }
    }
}
