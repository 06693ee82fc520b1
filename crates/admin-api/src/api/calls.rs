//! Call handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use callcenter_admin_core::{AnalyticsQuery, AnalyticsSummary, Call, CallFilter, CallNotesRequest, InitiateCallRequest};
use serde_json::{Value, json};

use super::{ApiJson, ApiPath, ApiQuery, ApiState, AppError};

pub async fn list_calls(
    State(state): State<ApiState>,
    ApiQuery(filter): ApiQuery<CallFilter>,
) -> Result<Json<Vec<Call>>, AppError> {
    Ok(Json(state.calls.list(filter).await?))
}

pub async fn get_call(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Call>, AppError> {
    Ok(Json(state.calls.get(id).await?))
}

/// Place an outbound call through the provider and record it
pub async fn initiate_call(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<InitiateCallRequest>,
) -> Result<(StatusCode, Json<Call>), AppError> {
    let call = state.dispatcher.initiate(req).await?;
    Ok((StatusCode::CREATED, Json(call)))
}

pub async fn delete_call(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>, AppError> {
    state.calls.delete(id).await?;
    Ok(Json(json!({ "message": "Call deleted successfully" })))
}

pub async fn update_call_notes(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<CallNotesRequest>,
) -> Result<Json<Call>, AppError> {
    Ok(Json(state.calls.update_notes(id, req).await?))
}

/// Totals by status, direction and agent over an optional inclusive date range
pub async fn analytics_summary(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(state.calls.analytics_summary(query).await?))
}
