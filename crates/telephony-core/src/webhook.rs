//! Form payloads posted by the provider

use callcenter_admin_core::{CallStatus, Error as CoreError};
use serde::Deserialize;

use crate::Result;

/// Lifecycle update for a call (`/api/twilio/call-status`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCallback {
    pub call_sid: String,
    pub call_status: String,
    #[serde(default)]
    pub call_duration: Option<String>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl StatusCallback {
    pub fn status(&self) -> Result<CallStatus> {
        Ok(self.call_status.parse::<CallStatus>()?)
    }

    /// Duration in seconds when the provider reported one
    pub fn duration(&self) -> Result<Option<i64>> {
        match self.call_duration.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => {
                let seconds: i64 = raw.parse().map_err(|_| {
                    CoreError::validation(format!("CallDuration '{}' is not a number", raw))
                })?;
                if seconds < 0 {
                    return Err(CoreError::validation("CallDuration must not be negative").into());
                }
                Ok(Some(seconds))
            }
        }
    }

    pub fn recording_url(&self) -> Option<&str> {
        self.recording_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Inbound call entry (`/api/twilio/voice`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceWebhook {
    #[serde(default)]
    pub call_sid: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub call_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(status: &str, duration: Option<&str>) -> StatusCallback {
        StatusCallback {
            call_sid: "CA1".to_string(),
            call_status: status.to_string(),
            call_duration: duration.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(callback("in-progress", None).status().unwrap(), CallStatus::InProgress);
        assert_eq!(callback("no_answer", None).status().unwrap(), CallStatus::NoAnswer);
        assert!(callback("exploded", None).status().is_err());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(callback("completed", Some("42")).duration().unwrap(), Some(42));
        assert_eq!(callback("completed", Some("")).duration().unwrap(), None);
        assert_eq!(callback("completed", None).duration().unwrap(), None);
        assert!(callback("completed", Some("abc")).duration().is_err());
        assert!(callback("completed", Some("-5")).duration().is_err());
    }
}
