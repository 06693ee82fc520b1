//! Core types for the call center admin service

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{not_blank, validate_phone, validate_skills};

/// Agent availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AgentStatus {
    Available,
    Busy,
    Offline,
    Break,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
            Self::Break => "break",
        }
    }
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "offline" => Ok(Self::Offline),
            "break" => Ok(Self::Break),
            other => Err(crate::Error::validation(format!("Unknown agent status '{}'", other))),
        }
    }
}

/// Call status as reported by the telephony provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Failed,
    Busy,
    NoAnswer,
    Canceled,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Initiated => "initiated",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Busy => "busy",
            Self::NoAnswer => "no-answer",
            Self::Canceled => "canceled",
        }
    }

    /// Terminal states carry a meaningful duration
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Busy | Self::NoAnswer | Self::Canceled
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Providers are inconsistent about separators
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "queued" => Ok(Self::Queued),
            "initiated" => Ok(Self::Initiated),
            "ringing" => Ok(Self::Ringing),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "busy" => Ok(Self::Busy),
            "no-answer" => Ok(Self::NoAnswer),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            other => Err(crate::Error::validation(format!("Unknown call status '{}'", other))),
        }
    }
}

/// Call direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

impl CallDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call-handling operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub status: AgentStatus,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Single telephony session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: i64,
    pub call_sid: String,
    pub from: String,
    pub to: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
    pub agent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or fully replacing an agent.
///
/// `name` and `phone` are optional at the serde level so that a missing field
/// surfaces as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentRequest {
    #[validate(
        required(message = "Name is required"),
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: Option<String>,

    #[validate(email(message = "Email address is invalid"))]
    pub email: Option<String>,

    #[validate(required(message = "Phone is required"), custom(function = "validate_phone"))]
    pub phone: Option<String>,

    pub status: Option<AgentStatus>,

    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
}

impl AgentRequest {
    /// Trim text fields and treat an empty email as absent
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.phone = self.phone.map(|p| p.trim().to_string());
        self.email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self
    }
}

/// Request body for the status-only patch
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentStatusRequest {
    pub status: AgentStatus,
}

/// Request body for placing an outbound call
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InitiateCallRequest {
    #[validate(
        required(message = "Destination number is required"),
        custom(function = "validate_phone")
    )]
    pub to: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub from: Option<String>,

    pub agent_id: Option<i64>,
}

/// Request body for the notes patch
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CallNotesRequest {
    #[validate(length(max = 10000, message = "Notes must not exceed 10000 characters"))]
    pub notes: String,
}

/// Row to insert into the call ledger
#[derive(Debug, Clone)]
pub struct NewCall {
    pub call_sid: String,
    pub from: String,
    pub to: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub duration: i64,
    pub recording_url: Option<String>,
    pub agent_id: Option<i64>,
    pub notes: Option<String>,
    /// Defaults to the insertion time
    pub created_at: Option<DateTime<Utc>>,
}

/// Filter for listing calls
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CallFilter {
    pub status: Option<CallStatus>,
    pub direction: Option<CallDirection>,
    pub agent_id: Option<i64>,
    pub limit: Option<u32>,
}

/// Inclusive date range for the analytics summary
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: CallStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionCount {
    pub direction: CallDirection,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCallCount {
    pub agent_id: i64,
    pub agent_name: String,
    pub count: i64,
}

/// Aggregated call statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_calls: i64,
    pub by_status: Vec<StatusCount>,
    pub by_direction: Vec<DirectionCount>,
    pub average_duration: f64,
    pub by_agent: Vec<AgentCallCount>,
}
