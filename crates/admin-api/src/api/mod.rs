//! REST API for the call center admin service
//!
//! Everything is mounted under `/api`. The admin resources (agents, calls,
//! settings) sit behind the bearer-token check; health and the provider
//! webhooks stay public.

pub mod agents;
pub mod auth;
pub mod calls;
pub mod error;
pub mod health;
pub mod security_headers;
pub mod settings;
pub mod twilio;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use callcenter_admin_core::{AgentRegistry, AppConfig, AuthConfig, CallLedger, Database, SettingsStore};
use callcenter_telephony_core::{CallDispatcher, TelephonyProvider, VoiceConfig};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiForm, ApiJson, ApiPath, ApiQuery, AppError, ErrorDetail, ErrorResponse};

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub db: Database,
    pub agents: AgentRegistry,
    pub calls: CallLedger,
    pub settings: SettingsStore,
    pub dispatcher: CallDispatcher,
    pub voice: Arc<VoiceConfig>,
    pub auth: AuthConfig,
}

impl ApiState {
    pub fn new(db: Database, config: &AppConfig, provider: Arc<dyn TelephonyProvider>) -> Self {
        let agents = AgentRegistry::new(db.clone());
        let calls = CallLedger::new(db.clone());
        let settings = SettingsStore::new(db.clone());
        let dispatcher = CallDispatcher::new(
            agents.clone(),
            calls.clone(),
            settings.clone(),
            config.telephony.clone(),
            provider,
        );

        Self {
            db,
            agents,
            calls,
            settings,
            dispatcher,
            voice: Arc::new(VoiceConfig::from_config(&config.telephony)),
            auth: config.auth.clone(),
        }
    }
}

/// Create the REST API router
pub fn create_router(state: ApiState) -> Router {
    let protected = Router::new()
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/agents/:id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/agents/:id/status", patch(agents::update_agent_status))
        .route("/calls", get(calls::list_calls).post(calls::initiate_call))
        .route("/calls/analytics/summary", get(calls::analytics_summary))
        .route("/calls/:id", get(calls::get_call).delete(calls::delete_call))
        .route("/calls/:id/notes", patch(calls::update_call_notes))
        .route("/settings", get(settings::list_settings).put(settings::upsert_setting))
        .route(
            "/settings/database",
            get(settings::get_database_settings).put(settings::update_database_settings),
        )
        .route(
            "/settings/twilio",
            get(settings::get_twilio_settings).put(settings::update_twilio_settings),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/twilio/voice", post(twilio::voice))
        .route("/twilio/call-status", post(twilio::call_status));

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(middleware::from_fn(security_headers::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
