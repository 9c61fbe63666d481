use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    /// Postgres connection string; feedback is kept in memory without one.
    pub database_url: Option<String>,
    /// Key for the generation API; replies fall back to canned text without one.
    pub openrouter_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout: Duration,
    /// Refuse to analyse feedback (500) instead of falling back when no key is set.
    pub require_llm: bool,
    /// Bearer token guarding the dashboard routes; open when unset.
    pub dashboard_token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            openrouter_api_key: None,
            llm_model: DEFAULT_MODEL.to_string(),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            require_llm: false,
            dashboard_token: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value,
            })?,
            None => defaults.port,
        };

        let llm_timeout = match var("LLM_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "LLM_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value,
                    });
                }
            },
            None => defaults.llm_timeout,
        };

        let require_llm = match var("REQUIRE_LLM") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                name: "REQUIRE_LLM",
                expected: "true or false",
                value,
            })?,
            None => defaults.require_llm,
        };

        Ok(Self {
            port,
            database_url: var("DATABASE_URL"),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            llm_model: var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_timeout,
            require_llm,
            dashboard_token: var("DASHBOARD_TOKEN"),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.llm_timeout, Duration::from_secs(5));
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert!(!config.require_llm);
        assert!(config.openrouter_api_key.is_none());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/feedback"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("LLM_MODEL", "anthropic/claude-3-haiku"),
            ("LLM_TIMEOUT_SECS", "12"),
            ("REQUIRE_LLM", "yes"),
            ("DASHBOARD_TOKEN", "secret"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/feedback"));
        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm_model, "anthropic/claude-3-haiku");
        assert_eq!(config.llm_timeout, Duration::from_secs(12));
        assert!(config.require_llm);
        assert_eq!(config.dashboard_token.as_deref(), Some("secret"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("OPENROUTER_API_KEY", "   ")]).unwrap();
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("LLM_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { name: "LLM_TIMEOUT_SECS", .. })
        ));
        assert!(matches!(
            config_from(&[("REQUIRE_LLM", "maybe")]),
            Err(ConfigError::Invalid { name: "REQUIRE_LLM", .. })
        ));
    }
}
