//! Application configuration from environment variables, with defaults
//! suitable for local development. `.env` files are honored by the binary.

use crate::error::AppError;
use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_min: u32,
    pub pool_max: u32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub db: DbConfig,
    /// Server secret mixed into session-cookie signatures.
    pub session_secret: String,
    pub templates_dir: String,
    pub static_dir: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| AppError::Config(format!("invalid value for {}: {}", key, v))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let bind = env_or("WEBLOG_BIND", "127.0.0.1:9000")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid WEBLOG_BIND: {}", e)))?;
        Ok(AppConfig {
            bind,
            db: DbConfig {
                host: env_or("WEBLOG_DB_HOST", "127.0.0.1"),
                port: env_parse("WEBLOG_DB_PORT", 3306)?,
                user: env_or("WEBLOG_DB_USER", "weblog"),
                password: env_or("WEBLOG_DB_PASSWORD", "weblog"),
                database: env_or("WEBLOG_DB_NAME", "weblog"),
                pool_min: env_parse("WEBLOG_POOL_MIN", 1)?,
                pool_max: env_parse("WEBLOG_POOL_MAX", 10)?,
            },
            session_secret: env_or("WEBLOG_SESSION_SECRET", "change-me-in-production"),
            templates_dir: env_or("WEBLOG_TEMPLATES_DIR", "templates"),
            static_dir: env_or("WEBLOG_STATIC_DIR", "static"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Only asserts on keys the test environment does not set.
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.db.pool_min, 1);
        assert_eq!(cfg.db.pool_max, 10);
        assert_eq!(cfg.templates_dir, "templates");
    }
}
