//! Twilio REST client

use std::time::Duration;

use async_trait::async_trait;
use callcenter_admin_core::{CallStatus, TelephonyConfig};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::provider::{OutboundCall, PlacedCall, ProviderCredentials, TelephonyProvider};
use crate::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Call resource returned by `Calls.json`
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    status: String,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
}

/// Error body returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Provider client speaking the Twilio REST API
#[derive(Clone, Debug)]
pub struct TwilioClient {
    http: reqwest::Client,
    api_base: String,
}

impl TwilioClient {
    pub fn new(config: &TelephonyConfig) -> Result<Self> {
        Self::with_api_base(&config.api_base_url)
    }

    /// Client against a specific API host
    pub fn with_api_base(api_base: &str) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn calls_url(&self, account_sid: &str) -> String {
        format!("{}/2010-04-01/Accounts/{}/Calls.json", self.api_base, account_sid)
    }
}

/// Form fields for creating a call
pub fn call_form(credentials: &ProviderCredentials, call: &OutboundCall) -> Vec<(&'static str, String)> {
    let from = call
        .from
        .clone()
        .unwrap_or_else(|| credentials.from_number.clone());

    let mut form = vec![
        ("To", call.to.clone()),
        ("From", from),
        ("Url", credentials.voice_url()),
        ("StatusCallback", credentials.status_callback_url()),
        ("StatusCallbackMethod", "POST".to_string()),
    ];
    if credentials.record {
        form.push(("Record", "true".to_string()));
    }
    form
}

#[async_trait]
impl TelephonyProvider for TwilioClient {
    async fn place_call(&self, credentials: &ProviderCredentials, call: &OutboundCall) -> Result<PlacedCall> {
        let url = self.calls_url(&credentials.account_sid);
        let form = call_form(credentials, call);
        debug!("📞 Placing call to {} via {}", call.to, url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let api_error: Option<ApiError> = serde_json::from_str(&body).ok();
            let code = api_error.as_ref().and_then(|e| e.code);
            let message = api_error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Call creation failed with status: {}", status));

            warn!("❌ Provider rejected call to {}: {} ({})", call.to, message, status);
            return Err(Error::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let resource: CallResource = response.json().await?;
        let call_status = resource.status.parse::<CallStatus>().unwrap_or_else(|_| {
            warn!("Provider returned unknown call status '{}', treating as queued", resource.status);
            CallStatus::Queued
        });

        info!("✅ Provider accepted call {} to {}", resource.sid, call.to);
        Ok(PlacedCall {
            sid: resource.sid,
            status: call_status,
            from: resource
                .from
                .unwrap_or_else(|| call.from.clone().unwrap_or_else(|| credentials.from_number.clone())),
            to: resource.to.unwrap_or_else(|| call.to.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(record: bool) -> ProviderCredentials {
        ProviderCredentials {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15550000000".to_string(),
            base_url: "https://cc.example.com".to_string(),
            record,
        }
    }

    #[test]
    fn test_call_form_fields() {
        let call = OutboundCall {
            to: "+15551112222".to_string(),
            from: None,
        };
        let form = call_form(&credentials(false), &call);

        assert_eq!(form[0], ("To", "+15551112222".to_string()));
        assert_eq!(form[1], ("From", "+15550000000".to_string()));
        assert_eq!(form[2], ("Url", "https://cc.example.com/api/twilio/voice".to_string()));
        assert_eq!(
            form[3],
            ("StatusCallback", "https://cc.example.com/api/twilio/call-status".to_string())
        );
        assert_eq!(form[4], ("StatusCallbackMethod", "POST".to_string()));
        assert!(!form.iter().any(|(k, _)| *k == "Record"));
    }

    #[test]
    fn test_call_form_with_overrides() {
        let call = OutboundCall {
            to: "+15551112222".to_string(),
            from: Some("+15553334444".to_string()),
        };
        let form = call_form(&credentials(true), &call);

        assert_eq!(form[1].1, "+15553334444");
        assert!(form.contains(&("Record", "true".to_string())));
    }

    #[test]
    fn test_calls_url() {
        let client = TwilioClient::with_api_base("https://api.twilio.com/").unwrap();
        assert_eq!(
            client.calls_url("AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls.json"
        );
    }
}
