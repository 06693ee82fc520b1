//! Call dispatcher
//!
//! Orchestrates outbound call initiation and provider status callbacks on top
//! of the agent registry, call ledger and settings store.
//!
//! Initiation places the provider call before touching the database. The
//! ledger insert and the agent `busy` flip then commit in one transaction, so
//! a rejected provider request leaves no local trace. If the local write fails
//! after the provider accepted the call, the provider call id is logged and the
//! error is returned; nothing is compensated.

use std::sync::Arc;

use callcenter_admin_core::{
    AgentRegistry, AgentStatus, Call, CallDirection, CallLedger, CallStatus, Error as CoreError,
    InitiateCallRequest, NewCall, SettingsStore, StatusUpdate, TelephonyConfig,
};
use tracing::{error, info, warn};
use validator::Validate;

use crate::Result;
use crate::provider::{OutboundCall, ProviderCredentials, TelephonyProvider};
use crate::webhook::StatusCallback;

/// Outbound call orchestration and status callback handling
#[derive(Clone)]
pub struct CallDispatcher {
    agents: AgentRegistry,
    calls: CallLedger,
    settings: SettingsStore,
    config: TelephonyConfig,
    provider: Arc<dyn TelephonyProvider>,
}

impl CallDispatcher {
    pub fn new(
        agents: AgentRegistry,
        calls: CallLedger,
        settings: SettingsStore,
        config: TelephonyConfig,
        provider: Arc<dyn TelephonyProvider>,
    ) -> Self {
        Self {
            agents,
            calls,
            settings,
            config,
            provider,
        }
    }

    /// Place an outbound call and record it
    pub async fn initiate(&self, request: InitiateCallRequest) -> Result<Call> {
        request.validate().map_err(CoreError::from)?;

        let to = request
            .to
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let from = request
            .from
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        if let Some(agent_id) = request.agent_id {
            let agent = self.agents.get(agent_id).await?;
            if agent.status != AgentStatus::Available {
                return Err(CoreError::conflict(format!(
                    "Agent {} is {} and cannot take a call",
                    agent.id, agent.status
                ))
                .into());
            }
        }

        let stored = self.settings.twilio_credentials().await?;
        let credentials = ProviderCredentials::resolve(&self.config, &stored)?;

        let placed = self
            .provider
            .place_call(&credentials, &OutboundCall { to: to.clone(), from })
            .await?;

        // Early provider states collapse to in-progress
        let status = if placed.status.is_terminal() {
            placed.status
        } else {
            CallStatus::InProgress
        };

        let new_call = NewCall {
            call_sid: placed.sid.clone(),
            from: placed.from,
            to: placed.to,
            status,
            direction: CallDirection::Outbound,
            duration: 0,
            recording_url: None,
            agent_id: request.agent_id,
            notes: None,
            created_at: None,
        };

        match self.calls.record_outbound(new_call).await {
            Ok(call) => {
                info!("📞 Outbound call {} to {} initiated", call.call_sid, to);
                Ok(call)
            }
            Err(e) => {
                error!(
                    "Provider call {} was placed but could not be recorded: {}",
                    placed.sid, e
                );
                Err(e.into())
            }
        }
    }

    /// Apply a provider lifecycle update. Unknown call ids are acknowledged.
    pub async fn handle_status_callback(&self, callback: StatusCallback) -> Result<StatusUpdate> {
        let status = callback.status()?;
        let duration = callback.duration()?;

        let outcome = self
            .calls
            .apply_status_update(&callback.call_sid, status, duration, callback.recording_url())
            .await?;

        match outcome {
            StatusUpdate::Applied => info!("Call {} is now {}", callback.call_sid, status),
            StatusUpdate::UnknownCall => warn!(
                "⚠️ Status callback for unknown call {} ({})",
                callback.call_sid, status
            ),
        }

        Ok(outcome)
    }

    pub fn config(&self) -> &TelephonyConfig {
        &self.config
    }
}
