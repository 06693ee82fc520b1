//! Agent handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use callcenter_admin_core::{Agent, AgentRequest, AgentStatusRequest};
use serde_json::{Value, json};

use super::{ApiJson, ApiPath, ApiState, AppError};

pub async fn list_agents(State(state): State<ApiState>) -> Result<Json<Vec<Agent>>, AppError> {
    Ok(Json(state.agents.list().await?))
}

pub async fn get_agent(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Agent>, AppError> {
    Ok(Json(state.agents.get(id).await?))
}

pub async fn create_agent(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<AgentRequest>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    let agent = state.agents.create(req).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn update_agent(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AgentRequest>,
) -> Result<Json<Agent>, AppError> {
    Ok(Json(state.agents.update(id, req).await?))
}

pub async fn delete_agent(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>, AppError> {
    state.agents.delete(id).await?;
    Ok(Json(json!({ "message": "Agent deleted successfully" })))
}

pub async fn update_agent_status(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AgentStatusRequest>,
) -> Result<Json<Agent>, AppError> {
    Ok(Json(state.agents.set_status(id, req.status).await?))
}
