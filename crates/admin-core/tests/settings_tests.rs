//! Settings store tests, focused on secret masking

use callcenter_admin_core::{
    Database, DatabaseConfig, DatabaseSettings, Error, MASK_PLACEHOLDER, SettingRequest,
    SettingsStore, TwilioSettings,
};
use tempfile::TempDir;

async fn create_test_store() -> (SettingsStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", temp_dir.path().join("settings.db").display()),
        max_connections: 2,
        acquire_timeout_secs: 5,
    };
    let db = Database::connect(&config).await.unwrap();
    (SettingsStore::new(db), temp_dir)
}

fn twilio_settings(token: &str) -> TwilioSettings {
    TwilioSettings {
        account_sid: "AC0123456789".to_string(),
        auth_token: token.to_string(),
        phone_number: "+15550001111".to_string(),
        callback_url: "https://cc.example.com".to_string(),
        enable_recording: true,
        enable_transcriptions: false,
    }
}

#[tokio::test]
async fn test_empty_store_reads_defaults() {
    let (store, _temp_dir) = create_test_store().await;

    assert_eq!(store.database().await.unwrap(), DatabaseSettings::default());
    assert_eq!(store.twilio().await.unwrap(), TwilioSettings::default());
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_twilio_secret_is_masked_on_read() {
    let (store, _temp_dir) = create_test_store().await;

    let written = store.update_twilio(twilio_settings("super-secret")).await.unwrap();
    assert_eq!(written.auth_token, MASK_PLACEHOLDER);
    assert_eq!(written.account_sid, "AC0123456789");
    assert!(written.enable_recording);

    let read = store.twilio().await.unwrap();
    assert_eq!(read.auth_token, MASK_PLACEHOLDER);

    let credentials = store.twilio_credentials().await.unwrap();
    assert_eq!(credentials.auth_token, "super-secret");

    let listed = store.read_all().await.unwrap();
    let token = listed
        .iter()
        .find(|s| s.category == "twilio" && s.key == "authToken")
        .unwrap();
    assert_eq!(token.value, MASK_PLACEHOLDER);
}

#[tokio::test]
async fn test_placeholder_write_keeps_secret() {
    let (store, _temp_dir) = create_test_store().await;

    store.update_twilio(twilio_settings("super-secret")).await.unwrap();

    // Round-trip the masked form with another field changed
    let mut form = store.twilio().await.unwrap();
    form.phone_number = "+15552223333".to_string();
    let written = store.update_twilio(form).await.unwrap();
    assert_eq!(written.auth_token, MASK_PLACEHOLDER);
    assert_eq!(written.phone_number, "+15552223333");

    let credentials = store.twilio_credentials().await.unwrap();
    assert_eq!(credentials.auth_token, "super-secret");
    assert_eq!(credentials.phone_number, "+15552223333");
}

#[tokio::test]
async fn test_placeholder_write_without_stored_secret() {
    let (store, _temp_dir) = create_test_store().await;

    let setting = store
        .upsert(SettingRequest {
            category: "twilio".to_string(),
            key: "authToken".to_string(),
            value: MASK_PLACEHOLDER.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(setting.category, "twilio");
    assert_eq!(setting.key, "authToken");
    assert_eq!(setting.value, "");
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generic_placeholder_write_returns_masked_row() {
    let (store, _temp_dir) = create_test_store().await;
    store.update_twilio(twilio_settings("super-secret")).await.unwrap();

    let setting = store
        .upsert(SettingRequest {
            category: "twilio".to_string(),
            key: "authToken".to_string(),
            value: MASK_PLACEHOLDER.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(setting.value, MASK_PLACEHOLDER);

    let credentials = store.twilio_credentials().await.unwrap();
    assert_eq!(credentials.auth_token, "super-secret");
}

#[tokio::test]
async fn test_omitted_secret_is_kept() {
    let (store, _temp_dir) = create_test_store().await;
    store.update_twilio(twilio_settings("super-secret")).await.unwrap();

    let form: TwilioSettings = serde_json::from_str(
        r#"{"accountSid": "AC0123456789", "phoneNumber": "+15554445555"}"#,
    )
    .unwrap();
    assert_eq!(form.auth_token, MASK_PLACEHOLDER);
    store.update_twilio(form).await.unwrap();

    let credentials = store.twilio_credentials().await.unwrap();
    assert_eq!(credentials.auth_token, "super-secret");
    assert_eq!(credentials.phone_number, "+15554445555");

    let db_form: DatabaseSettings = serde_json::from_str(r#"{"host": "db.internal"}"#).unwrap();
    assert_eq!(db_form.password, MASK_PLACEHOLDER);
}

#[tokio::test]
async fn test_database_password_masking() {
    let (store, _temp_dir) = create_test_store().await;

    let settings = DatabaseSettings {
        host: "db.internal".to_string(),
        port: "3306".to_string(),
        username: "callcenter".to_string(),
        password: "hunter2".to_string(),
        database: "callcenter".to_string(),
    };
    let written = store.update_database(settings.clone()).await.unwrap();
    assert_eq!(written.password, MASK_PLACEHOLDER);
    assert_eq!(written.host, "db.internal");

    store
        .upsert(SettingRequest {
            category: "database".to_string(),
            key: "password".to_string(),
            value: MASK_PLACEHOLDER.to_string(),
        })
        .await
        .unwrap();

    // Clearing the secret makes the masked read empty again
    let cleared = store
        .update_database(DatabaseSettings {
            password: String::new(),
            ..settings
        })
        .await
        .unwrap();
    assert_eq!(cleared.password, "");
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let (store, _temp_dir) = create_test_store().await;

    let bad_port = store
        .update_database(DatabaseSettings {
            port: "not-a-port".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(bad_port, Err(Error::Validation(_))));

    let bad_callback = store
        .update_twilio(TwilioSettings {
            callback_url: "ftp://example.com".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(bad_callback, Err(Error::Validation(_))));

    // Nothing was written
    assert!(store.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generic_upsert_uses_general_category() {
    let (store, _temp_dir) = create_test_store().await;

    let request: SettingRequest =
        serde_json::from_str(r#"{"name": "companyName", "value": "Acme"}"#).unwrap();
    let setting = store.upsert(request).await.unwrap();

    assert_eq!(setting.category, "general");
    assert_eq!(setting.key, "companyName");
    assert_eq!(setting.value, "Acme");
}
