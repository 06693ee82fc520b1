//! Provider abstraction
//!
//! The dispatcher talks to the telephony provider only through
//! [`TelephonyProvider`], so tests can swap in a scripted provider and the
//! REST client stays a thin adapter.

use std::fmt;

use async_trait::async_trait;
use callcenter_admin_core::{CallStatus, TelephonyConfig, TwilioSettings};

use crate::Result;

/// Account credentials and callback location used to place a call
#[derive(Clone, PartialEq)]
pub struct ProviderCredentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Default caller id
    pub from_number: String,
    /// Externally reachable base URL for webhooks
    pub base_url: String,
    pub record: bool,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("base_url", &self.base_url)
            .field("record", &self.record)
            .finish()
    }
}

fn pick(stored: &str, configured: Option<&String>) -> Option<String> {
    let stored = stored.trim();
    if !stored.is_empty() {
        return Some(stored.to_string());
    }
    configured
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderCredentials {
    /// Merge stored settings over deployment configuration. Non-empty stored
    /// values win.
    pub fn resolve(config: &TelephonyConfig, stored: &TwilioSettings) -> Result<Self> {
        let missing = |what: &str| {
            callcenter_admin_core::Error::config(format!("Telephony provider {} is not configured", what))
        };

        let account_sid =
            pick(&stored.account_sid, config.account_sid.as_ref()).ok_or_else(|| missing("account SID"))?;
        let auth_token =
            pick(&stored.auth_token, config.auth_token.as_ref()).ok_or_else(|| missing("auth token"))?;
        let from_number =
            pick(&stored.phone_number, config.phone_number.as_ref()).ok_or_else(|| missing("phone number"))?;
        let base_url =
            pick(&stored.callback_url, config.base_url.as_ref()).ok_or_else(|| missing("callback base URL"))?;

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            base_url: base_url.trim_end_matches('/').to_string(),
            record: stored.enable_recording,
        })
    }

    /// Voice webhook the provider fetches once the call connects
    pub fn voice_url(&self) -> String {
        format!("{}/api/twilio/voice", self.base_url)
    }

    /// Status webhook the provider posts lifecycle updates to
    pub fn status_callback_url(&self) -> String {
        format!("{}/api/twilio/call-status", self.base_url)
    }
}

/// Outbound call request handed to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    pub to: String,
    /// Caller id override; the account number is used when absent
    pub from: Option<String>,
}

/// Provider acknowledgement of a placed call
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCall {
    pub sid: String,
    pub status: CallStatus,
    pub from: String,
    pub to: String,
}

/// Places outbound calls with a telephony provider
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    async fn place_call(&self, credentials: &ProviderCredentials, call: &OutboundCall) -> Result<PlacedCall>;
}
