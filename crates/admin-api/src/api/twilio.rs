//! Provider webhooks
//!
//! Both endpoints take URL-encoded forms and answer with TwiML.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use callcenter_telephony_core::{StatusCallback, VoiceWebhook, empty_response, voice_response};
use tracing::{debug, info};

use super::{ApiForm, ApiState, AppError};

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

/// Inbound call: greet the caller and dial the agent line
pub async fn voice(
    State(state): State<ApiState>,
    ApiForm(webhook): ApiForm<VoiceWebhook>,
) -> Result<Response, AppError> {
    info!(
        "📲 Inbound call {} from {}",
        webhook.call_sid.as_deref().unwrap_or("-"),
        webhook.from.as_deref().unwrap_or("unknown")
    );
    Ok(xml(voice_response(&state.voice)?))
}

/// Call lifecycle update
pub async fn call_status(
    State(state): State<ApiState>,
    ApiForm(callback): ApiForm<StatusCallback>,
) -> Result<Response, AppError> {
    let outcome = state.dispatcher.handle_status_callback(callback).await?;
    debug!("Status callback outcome: {:?}", outcome);
    Ok(xml(empty_response()))
}
