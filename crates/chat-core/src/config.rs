use thiserror::Error;

use crate::chat::HISTORY_WINDOW;
use crate::config_env::{optional_trimmed_env, parse_u16_env, parse_usize_env};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_STORED_MESSAGES: usize = 200;
const DEFAULT_MAX_MESSAGE_CHARS: usize = 4_000;
const DEFAULT_MAX_IN_FLIGHT: usize = 16;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub max_stored_messages: usize,
    pub max_message_chars: usize,
    pub max_in_flight: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match optional_trimmed_env("API_BIND_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", parse_u16_env("PORT", DEFAULT_PORT)?),
        };

        let max_stored_messages =
            parse_usize_env("CHAT_MAX_STORED_MESSAGES", DEFAULT_MAX_STORED_MESSAGES)?;
        if max_stored_messages < HISTORY_WINDOW {
            return Err(ConfigError::InvalidConfiguration(format!(
                "CHAT_MAX_STORED_MESSAGES must be at least {HISTORY_WINDOW}"
            )));
        }

        let max_message_chars =
            parse_usize_env("CHAT_MAX_MESSAGE_CHARS", DEFAULT_MAX_MESSAGE_CHARS)?;
        if max_message_chars == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "CHAT_MAX_MESSAGE_CHARS must be greater than zero".to_string(),
            ));
        }

        let max_in_flight = parse_usize_env("CHAT_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?;
        if max_in_flight == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "CHAT_MAX_IN_FLIGHT must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr,
            max_stored_messages,
            max_message_chars,
            max_in_flight,
        })
    }
}

/// Loads `.env` from the working directory when present.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::{ApiConfig, ConfigError};

    const KEYS: [&str; 5] = [
        "API_BIND_ADDR",
        "PORT",
        "CHAT_MAX_STORED_MESSAGES",
        "CHAT_MAX_MESSAGE_CHARS",
        "CHAT_MAX_IN_FLIGHT",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: env-mutating tests are serialized.
            unsafe { std::env::remove_var(key) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    #[serial]
    fn defaults_bind_to_port_5000_on_all_interfaces() {
        clear_env();

        let config = ApiConfig::from_env().expect("defaults should load");
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.max_stored_messages, 200);
        assert_eq!(config.max_message_chars, 4_000);
        assert_eq!(config.max_in_flight, 16);
    }

    #[test]
    #[serial]
    fn port_env_is_used_when_bind_addr_is_absent() {
        clear_env();
        set_env("PORT", "8088");

        let config = ApiConfig::from_env().expect("port override should load");
        assert_eq!(config.bind_addr, "0.0.0.0:8088");

        set_env("API_BIND_ADDR", "127.0.0.1:9000");
        let config = ApiConfig::from_env().expect("bind addr should win");
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_stored_message_cap_below_history_window() {
        clear_env();
        set_env("CHAT_MAX_STORED_MESSAGES", "4");

        let err = ApiConfig::from_env().expect_err("cap below window should fail");
        assert!(matches!(err, ConfigError::InvalidConfiguration(_)));
        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_non_numeric_limits() {
        clear_env();
        set_env("CHAT_MAX_MESSAGE_CHARS", "lots");

        let err = ApiConfig::from_env().expect_err("non-numeric limit should fail");
        assert!(
            matches!(err, ConfigError::ParseInt(ref key) if key == "CHAT_MAX_MESSAGE_CHARS")
        );
        clear_env();
    }
}
