//! Settings handlers
//!
//! Secrets are always returned masked. Writing the mask back leaves the
//! stored secret untouched, so a form can round-trip what it was given.

use axum::extract::State;
use axum::Json;
use callcenter_admin_core::{DatabaseSettings, Setting, SettingRequest, TwilioSettings};

use super::{ApiJson, ApiState, AppError};

pub async fn list_settings(State(state): State<ApiState>) -> Result<Json<Vec<Setting>>, AppError> {
    Ok(Json(state.settings.read_all().await?))
}

pub async fn upsert_setting(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<SettingRequest>,
) -> Result<Json<Setting>, AppError> {
    Ok(Json(state.settings.upsert(req).await?))
}

pub async fn get_database_settings(
    State(state): State<ApiState>,
) -> Result<Json<DatabaseSettings>, AppError> {
    Ok(Json(state.settings.database().await?))
}

pub async fn update_database_settings(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<DatabaseSettings>,
) -> Result<Json<DatabaseSettings>, AppError> {
    Ok(Json(state.settings.update_database(req).await?))
}

pub async fn get_twilio_settings(State(state): State<ApiState>) -> Result<Json<TwilioSettings>, AppError> {
    Ok(Json(state.settings.twilio().await?))
}

pub async fn update_twilio_settings(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<TwilioSettings>,
) -> Result<Json<TwilioSettings>, AppError> {
    Ok(Json(state.settings.update_twilio(req).await?))
}
