use std::env;

/// Application configuration loaded from environment variables.
///
/// API keys and connection strings only. Pipeline tunables (caps, TTLs,
/// thresholds) are constants in the modules that own them.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres (catalog + durable analysis cache)
    pub database_url: String,

    // AI provider (relevance oracle, boring classifier)
    pub anthropic_api_key: String,

    // Tour inventory provider
    pub viator_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            viator_api_key: required_env("VIATOR_API_KEY"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
