//! Settings store
//!
//! Opaque key/value pairs grouped by category. Two categories have typed
//! views used by the settings pages: `database` and `twilio`. Secret values
//! never leave the store in clear text through the typed or listing reads;
//! they are replaced by [`MASK_PLACEHOLDER`] when set. Writing the
//! placeholder back leaves the stored secret untouched, so a form can be
//! round-tripped without re-entering secrets.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};
use validator::Validate;

use crate::database::{Database, DbSetting};
use crate::validation::not_blank;
use crate::{Error, Result};

/// Shown instead of a stored secret
pub const MASK_PLACEHOLDER: &str = "••••••••••••••••••••••••••••••••";

pub const DATABASE_CATEGORY: &str = "database";
pub const TWILIO_CATEGORY: &str = "twilio";

const GENERAL_CATEGORY: &str = "general";

/// `(category, key)` pairs whose values are masked on read
const SECRET_KEYS: &[(&str, &str)] = &[(DATABASE_CATEGORY, "password"), (TWILIO_CATEGORY, "authToken")];

fn is_secret(category: &str, key: &str) -> bool {
    SECRET_KEYS.iter().any(|(c, k)| *c == category && *k == key)
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        MASK_PLACEHOLDER.to_string()
    }
}

/// One stored setting as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub category: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Generic single-value write
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SettingRequest {
    #[serde(default = "default_category")]
    #[validate(custom(function = "not_blank", message = "Category is required"))]
    pub category: String,

    #[serde(alias = "name")]
    #[validate(custom(function = "not_blank", message = "Key is required"))]
    pub key: String,

    pub value: String,
}

fn default_category() -> String {
    GENERAL_CATEGORY.to_string()
}

/// A secret omitted from a typed write keeps its stored value
fn unchanged_secret() -> String {
    MASK_PLACEHOLDER.to_string()
}

/// Connection parameters for an external relational store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: String,
    pub username: String,
    #[serde(default = "unchanged_secret")]
    pub password: String,
    pub database: String,
}

impl DatabaseSettings {
    fn from_values(values: &HashMap<String, String>) -> Self {
        let get = |key: &str| values.get(key).cloned().unwrap_or_default();
        Self {
            host: get("host"),
            port: get("port"),
            username: get("username"),
            password: get("password"),
            database: get("database"),
        }
    }

    fn to_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("host", self.host.trim().to_string()),
            ("port", self.port.trim().to_string()),
            ("username", self.username.trim().to_string()),
            ("password", self.password.clone()),
            ("database", self.database.trim().to_string()),
        ]
    }

    fn masked(mut self) -> Self {
        self.password = mask(&self.password);
        self
    }
}

/// Telephony provider account settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TwilioSettings {
    pub account_sid: String,
    #[serde(default = "unchanged_secret")]
    pub auth_token: String,
    pub phone_number: String,
    pub callback_url: String,
    pub enable_recording: bool,
    pub enable_transcriptions: bool,
}

impl TwilioSettings {
    fn from_values(values: &HashMap<String, String>) -> Self {
        let get = |key: &str| values.get(key).cloned().unwrap_or_default();
        let flag = |key: &str| values.get(key).map(|v| v == "true").unwrap_or(false);
        Self {
            account_sid: get("accountSid"),
            auth_token: get("authToken"),
            phone_number: get("phoneNumber"),
            callback_url: get("callbackUrl"),
            enable_recording: flag("enableRecording"),
            enable_transcriptions: flag("enableTranscriptions"),
        }
    }

    fn to_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("accountSid", self.account_sid.trim().to_string()),
            ("authToken", self.auth_token.clone()),
            ("phoneNumber", self.phone_number.trim().to_string()),
            ("callbackUrl", self.callback_url.trim().to_string()),
            ("enableRecording", self.enable_recording.to_string()),
            ("enableTranscriptions", self.enable_transcriptions.to_string()),
        ]
    }

    fn masked(mut self) -> Self {
        self.auth_token = mask(&self.auth_token);
        self
    }

    fn validate_values(&self) -> Result<()> {
        let callback = self.callback_url.trim();
        if !callback.is_empty() && !(callback.starts_with("http://") || callback.starts_with("https://")) {
            return Err(Error::validation("Callback URL must be an http(s) URL"));
        }
        Ok(())
    }
}

/// Settings persisted in the call center database
#[derive(Clone, Debug)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every stored setting, secrets masked
    pub async fn read_all(&self) -> Result<Vec<Setting>> {
        let rows: Vec<DbSetting> = sqlx::query_as(
            "SELECT category, key, value, updated_at FROM settings ORDER BY category, key",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let value = if is_secret(&row.category, &row.key) {
                    mask(&row.value)
                } else {
                    row.value
                };
                Setting {
                    category: row.category,
                    key: row.key,
                    value,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }

    /// Database connection settings with the password masked
    pub async fn database(&self) -> Result<DatabaseSettings> {
        let values = self.read_category(DATABASE_CATEGORY).await?;
        Ok(DatabaseSettings::from_values(&values).masked())
    }

    /// Provider settings with the auth token masked
    pub async fn twilio(&self) -> Result<TwilioSettings> {
        let values = self.read_category(TWILIO_CATEGORY).await?;
        Ok(TwilioSettings::from_values(&values).masked())
    }

    /// Provider settings in clear text. Internal use only.
    pub async fn twilio_credentials(&self) -> Result<TwilioSettings> {
        let values = self.read_category(TWILIO_CATEGORY).await?;
        Ok(TwilioSettings::from_values(&values))
    }

    /// Replace the database category in one transaction
    pub async fn update_database(&self, settings: DatabaseSettings) -> Result<DatabaseSettings> {
        if !settings.port.trim().is_empty() && settings.port.trim().parse::<u16>().is_err() {
            return Err(Error::validation("Port must be a number between 0 and 65535"));
        }

        self.write_category(DATABASE_CATEGORY, settings.to_values()).await?;
        info!("⚙️ Database settings updated");
        self.database().await
    }

    /// Replace the twilio category in one transaction
    pub async fn update_twilio(&self, settings: TwilioSettings) -> Result<TwilioSettings> {
        settings.validate_values()?;

        self.write_category(TWILIO_CATEGORY, settings.to_values()).await?;
        info!("⚙️ Twilio settings updated");
        self.twilio().await
    }

    /// Write one key/value pair
    pub async fn upsert(&self, request: SettingRequest) -> Result<Setting> {
        request.validate()?;
        let category = request.category.trim().to_string();
        let key = request.key.trim().to_string();

        let mut tx = self.db.pool().begin().await?;
        upsert_value(&mut tx, &category, &key, &request.value).await?;
        tx.commit().await?;

        let row: Option<DbSetting> = sqlx::query_as(
            "SELECT category, key, value, updated_at FROM settings WHERE category = ? AND key = ?",
        )
        .bind(&category)
        .bind(&key)
        .fetch_optional(self.db.pool())
        .await?;

        // Only a skipped placeholder write leaves no row behind
        let Some(row) = row else {
            return Ok(Setting {
                category,
                key,
                value: String::new(),
                updated_at: Utc::now(),
            });
        };

        let value = if is_secret(&row.category, &row.key) {
            mask(&row.value)
        } else {
            row.value
        };

        Ok(Setting {
            category: row.category,
            key: row.key,
            value,
            updated_at: row.updated_at,
        })
    }

    async fn read_category(&self, category: &str) -> Result<HashMap<String, String>> {
        let rows: Vec<DbSetting> =
            sqlx::query_as("SELECT category, key, value, updated_at FROM settings WHERE category = ?")
                .bind(category)
                .fetch_all(self.db.pool())
                .await?;

        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    async fn write_category(&self, category: &str, values: Vec<(&'static str, String)>) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        for (key, value) in &values {
            upsert_value(&mut tx, category, key, value).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Upsert a value unless it is the masking placeholder for a secret key
async fn upsert_value(tx: &mut Transaction<'_, Sqlite>, category: &str, key: &str, value: &str) -> Result<()> {
    if is_secret(category, key) && value == MASK_PLACEHOLDER {
        debug!("Keeping stored secret {}.{}", category, key);
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO settings (category, key, value, updated_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(category, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(category)
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_only_non_empty() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("secret"), MASK_PLACEHOLDER);
        assert_eq!(MASK_PLACEHOLDER.chars().count(), 32);
    }

    #[test]
    fn test_secret_keys() {
        assert!(is_secret("twilio", "authToken"));
        assert!(is_secret("database", "password"));
        assert!(!is_secret("twilio", "accountSid"));
        assert!(!is_secret("general", "password"));
    }

    #[test]
    fn test_twilio_flags_roundtrip_through_strings() {
        let settings = TwilioSettings {
            enable_recording: true,
            ..Default::default()
        };
        let values: HashMap<String, String> = settings
            .to_values()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(values["enableRecording"], "true");
        assert_eq!(values["enableTranscriptions"], "false");
        assert_eq!(TwilioSettings::from_values(&values), settings);
    }

    #[tokio::test]
    async fn test_generic_upsert_overwrites() {
        let store = SettingsStore::new(Database::connect_in_memory().await.unwrap());

        let request = SettingRequest {
            category: "general".to_string(),
            key: "companyName".to_string(),
            value: "Acme".to_string(),
        };
        store.upsert(request.clone()).await.unwrap();

        let updated = store
            .upsert(SettingRequest {
                value: "Acme Corp".to_string(),
                ..request
            })
            .await
            .unwrap();
        assert_eq!(updated.value, "Acme Corp");

        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_key_rejected() {
        let store = SettingsStore::new(Database::connect_in_memory().await.unwrap());
        let err = store
            .upsert(SettingRequest {
                category: "general".to_string(),
                key: "  ".to_string(),
                value: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
