//! Configuration for the call center admin service
//!
//! Values are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional file (TOML, YAML or JSON, chosen by extension)
//! 3. `CALLCENTER__<SECTION>__<KEY>` environment variables
//! 4. the plain deployment variables (`PORT`, `DATABASE_URL`, `TWILIO_*`, ...)

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telephony: TelephonyConfig,
    pub auth: AuthConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Telephony provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub phone_number: Option<String>,
    /// Externally reachable base URL the provider calls back into
    pub base_url: Option<String>,
    /// Destination dialed by the inbound voice webhook
    pub agent_phone_number: Option<String>,
    pub api_base_url: String,
    pub greeting: String,
}

/// Bearer-token presence check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub require_token: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://callcenter.db?mode=rwc".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            phone_number: None,
            base_url: None,
            agent_phone_number: None,
            api_base_url: "https://api.twilio.com".to_string(),
            greeting: "Thank you for calling our call center. Please wait while we connect you to an agent."
                .to_string(),
        }
    }
}

/// Plain environment variable names and the config keys they override
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("DB_POOL_SIZE", "database.max_connections"),
    ("TWILIO_ACCOUNT_SID", "telephony.account_sid"),
    ("TWILIO_AUTH_TOKEN", "telephony.auth_token"),
    ("TWILIO_PHONE_NUMBER", "telephony.phone_number"),
    ("BASE_URL", "telephony.base_url"),
    ("AGENT_PHONE_NUMBER", "telephony.agent_phone_number"),
];

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CALLCENTER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in LEGACY_ENV {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(crate::Error::config("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(crate::Error::config("database.max_connections must be at least 1"));
        }
        if let Some(base) = &self.telephony.base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(crate::Error::config(format!(
                    "telephony.base_url must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ALL_VARS: &[&str] = &[
        "PORT",
        "DATABASE_URL",
        "DB_POOL_SIZE",
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "TWILIO_PHONE_NUMBER",
        "BASE_URL",
        "AGENT_PHONE_NUMBER",
        "CALLCENTER__SERVER__PORT",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.telephony.account_sid.is_none());
        assert!(!config.auth.require_token);
    }

    #[test]
    #[serial]
    fn test_legacy_env_overrides_prefixed_env() {
        clear_env();
        unsafe {
            std::env::set_var("CALLCENTER__SERVER__PORT", "7000");
            std::env::set_var("TWILIO_ACCOUNT_SID", "AC123");
            std::env::set_var("DB_POOL_SIZE", "4");
        }

        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.telephony.account_sid.as_deref(), Some("AC123"));
        assert_eq!(config.database.max_connections, 4);

        unsafe { std::env::set_var("PORT", "8080") };
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_file_source() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[telephony]\nbase_url = \"https://cc.example.com\"\n\n[auth]\nrequire_token = true"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.telephony.base_url.as_deref(), Some("https://cc.example.com"));
        assert!(config.auth.require_token);
    }

    #[test]
    #[serial]
    fn test_file_format_follows_extension() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"server": {{"port": 9090}}, "auth": {{"require_token": true}}}}"#).unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(config.auth.require_token);
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = AppConfig::default();
        config.telephony.base_url = Some("ftp://nope".to_string());
        assert!(config.validate().is_err());
    }
}
