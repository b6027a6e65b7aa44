use std::env;

/// AppConfig
///
/// Holds the application's configuration, loaded once at startup and shared through the
/// application state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory page store.
    pub db_url: Option<String>,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Runtime environment marker. Selects the log format and which settings are mandatory.
    pub env: Env,
}

/// Env
///
/// The runtime context: `Local` for development and tests, `Production` for deployments
/// that must be backed by Postgres.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// Local, in-memory configuration for tests; reads no environment variables.
    fn default() -> Self {
        Self {
            db_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (`APP_ENV`, `DATABASE_URL`,
    /// `BIND_ADDR`).
    ///
    /// # Panics
    /// Panics in `Production` when `DATABASE_URL` is not set.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in production"),
            ),
            Env::Local => env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            db_url,
            bind_addr,
            env,
        }
    }
}
