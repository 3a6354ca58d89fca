//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Rate limiting for mutating routes.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Allocation and reversal tuning.
    #[serde(default)]
    pub allocation: AllocationConfig,
    /// SKU generation tuning.
    #[serde(default)]
    pub sku: SkuConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret shared with the auth service for verifying tokens.
    pub secret: String,
}

/// Fixed-window rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per caller per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// How often the janitor sweeps expired windows, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_max_requests() -> u32 {
    120
}

fn default_window_secs() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

/// Allocation and reversal tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationConfig {
    /// Attempts made when a concurrent update wins the race for a batch.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

/// SKU generation tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SkuConfig {
    /// Commits attempted before giving up on a contended base code.
    #[serde(default = "default_sku_attempts")]
    pub max_attempts: u32,
}

impl Default for SkuConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_sku_attempts(),
        }
    }
}

fn default_sku_attempts() -> u32 {
    16
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKWISE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("STOCKWISE__DATABASE__URL", Some("postgres://localhost/stockwise_test")),
                ("STOCKWISE__JWT__SECRET", Some("test-secret")),
                ("STOCKWISE__SERVER__PORT", Some("9090")),
                ("STOCKWISE__ALLOCATION__MAX_RETRIES", Some("5")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/stockwise_test");
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.allocation.max_retries, 5);
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.rate_limit.window_secs, 60);
                assert_eq!(config.sku.max_attempts, 16);
            },
        );
    }

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);

        let rate_limit = RateLimitConfig::default();
        assert_eq!(rate_limit.max_requests, 120);
        assert_eq!(rate_limit.sweep_interval_secs, 300);
    }
}
