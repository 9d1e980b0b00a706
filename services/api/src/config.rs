//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_LLM_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub llm_api_key: String,
    pub llm_api_base: String,
    pub chat_model: String,
    pub cors_allowed_origin: String,
    pub cookie_secure: bool,
    pub chat_history_turns: usize,
    pub chat_idle_minutes: i64,
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Model Settings ---
        let llm_api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GOOGLE_API_KEY".to_string()))?;
        let llm_api_base =
            lookup("LLM_API_BASE").unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string());
        let chat_model = lookup("CHAT_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string());

        // --- Load Web Settings ---
        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let cookie_secure = parse_var("COOKIE_SECURE", lookup("COOKIE_SECURE"), true)?;
        let chat_history_turns = parse_var("CHAT_HISTORY_TURNS", lookup("CHAT_HISTORY_TURNS"), 20)?;
        let chat_idle_minutes = parse_var("CHAT_IDLE_MINUTES", lookup("CHAT_IDLE_MINUTES"), 60)?;
        if chat_idle_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "CHAT_IDLE_MINUTES".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            llm_api_key,
            llm_api_base,
            chat_model,
            cors_allowed_origin,
            cookie_secure,
            chat_history_turns,
            chat_idle_minutes,
        })
    }

    /// Whether `DATABASE_URL` selects the in-process store.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/courses"),
            ("GOOGLE_API_KEY", "key"),
        ]))
        .expect("config");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert_eq!(config.llm_api_base, DEFAULT_LLM_API_BASE);
        assert!(config.cookie_secure);
        assert_eq!(config.chat_history_turns, 20);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "memory://")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(name) if name == "GOOGLE_API_KEY"));
    }

    #[test]
    fn bad_numbers_are_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("GOOGLE_API_KEY", "key"),
            ("CHAT_HISTORY_TURNS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "CHAT_HISTORY_TURNS"));
    }

    #[test]
    fn memory_url_selects_in_process_store() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("GOOGLE_API_KEY", "key"),
            ("COOKIE_SECURE", "false"),
        ]))
        .expect("config");
        assert!(config.uses_memory_store());
        assert!(!config.cookie_secure);
    }
}
