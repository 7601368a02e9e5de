use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use thiserror::Error;

use crate::types::CommandName;

/// Passphrase used when ENCRYPTION_KEY is unset. Anything encrypted with it is readable by
/// anyone who has seen this source, so boot logs a warning whenever it is in effect.
pub const DEFAULT_ENCRYPTION_KEY: &str = "default-test-key";

pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub token: String,
    /// Operator identity; compared as a string against the caller id
    pub admin_id: Option<String>,
    /// Public base URL used to register `<base>/webhook`
    pub base_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub admin_only_commands: BTreeSet<CommandName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub encryption_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl SecurityConfig {
    /// Just the encryption settings, for tools that never touch the bot or the store
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            encryption_key: lookup("ENCRYPTION_KEY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENCRYPTION_KEY.to_string()),
        }
    }

    pub fn uses_default_key(&self) -> bool {
        self.encryption_key == DEFAULT_ENCRYPTION_KEY
    }
}

impl BotConfig {
    /// Full webhook URL, if a base URL is configured
    pub fn webhook_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }
}

impl AppConfig {
    /// Load configuration from the process environment (after `.env` has been applied)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup; `from_env` is this over `std::env`
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let token = get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let base_url = match get("BASE_URL") {
            Some(raw) => {
                url::Url::parse(&raw).map_err(|_| ConfigError::Invalid {
                    key: "BASE_URL",
                    value: raw.clone(),
                })?;
                Some(raw)
            }
            None => None,
        };

        let admin_only_commands = match get("ADMIN_ONLY_COMMANDS") {
            Some(list) => parse_command_set(&list)?,
            None => BTreeSet::from([CommandName::NewProject]),
        };

        let (max_connections, connection_timeout) = match environment {
            Environment::Development => (5, 30),
            Environment::Staging => (10, 10),
            Environment::Production => (20, 5),
        };

        let mut config = Self {
            environment,
            bot: BotConfig {
                token,
                admin_id: get("ADMIN_TELEGRAM_ID"),
                base_url,
                webhook_secret: get("WEBHOOK_SECRET"),
                admin_only_commands,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                connection_timeout,
            },
            security: SecurityConfig::from_source(&lookup),
            server: ServerConfig { port: DEFAULT_PORT },
        };

        // Specific overrides
        if let Some(v) = get("PORT") {
            config.server.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_number("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            config.database.connection_timeout = parse_number("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_command_set(list: &str) -> Result<BTreeSet<CommandName>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            CommandName::parse(name).ok_or_else(|| ConfigError::Invalid {
                key: "ADMIN_ONLY_COMMANDS",
                value: name.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("TELEGRAM_TOKEN", "123:abc"),
        ("DATABASE_URL", "postgres://localhost/nezarat"),
    ];

    #[test]
    fn missing_token_is_fatal() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_TOKEN")));
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let err = load(&[("TELEGRAM_TOKEN", "t")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.security.uses_default_key());
        assert!(config.bot.admin_id.is_none());
        assert!(config.bot.webhook_url().is_none());
        assert_eq!(
            config.bot.admin_only_commands,
            BTreeSet::from([CommandName::NewProject])
        );
    }

    #[test]
    fn overrides_apply() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("APP_ENV", "production"),
            ("PORT", "8080"),
            ("ADMIN_TELEGRAM_ID", "42"),
            ("BASE_URL", "https://bot.example.com/"),
            ("ENCRYPTION_KEY", "s3cret"),
            ("ADMIN_ONLY_COMMANDS", "status, newproject"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
        ]);
        let config = load(&pairs).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.bot.admin_id.as_deref(), Some("42"));
        assert_eq!(
            config.bot.webhook_url().as_deref(),
            Some("https://bot.example.com/webhook")
        );
        assert!(!config.security.uses_default_key());
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.database.connection_timeout, 5);
        assert!(config.bot.admin_only_commands.contains(&CommandName::Status));
        assert!(!config.bot.admin_only_commands.contains(&CommandName::Start));
    }

    #[test]
    fn rejects_bad_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(matches!(load(&pairs), Err(ConfigError::Invalid { key: "PORT", .. })));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ADMIN_ONLY_COMMANDS", "start,reboot"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid { key: "ADMIN_ONLY_COMMANDS", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BASE_URL", "not a url"));
        assert!(matches!(load(&pairs), Err(ConfigError::Invalid { key: "BASE_URL", .. })));
    }

    #[test]
    fn empty_admin_only_list_gates_nothing() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ADMIN_ONLY_COMMANDS", ","));
        let config = load(&pairs).unwrap();
        assert!(config.bot.admin_only_commands.is_empty());
    }
}
