//! Console events, rejections and user-facing notices

use callcenter_admin_core::AgentStatus;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::ConsoleCall;

/// State change produced by a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConsoleEvent {
    #[serde(rename_all = "camelCase")]
    AgentStatusChanged { agent_id: i64, status: AgentStatus },
    CallStarted { call: ConsoleCall },
    CallEnded { call: ConsoleCall },
}

/// Why a transition was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Call already in progress")]
    CallAlreadyActive,

    #[error("No available agents")]
    NoAvailableAgent,
}

impl Rejection {
    pub fn notice(&self) -> Notice {
        let description = match self {
            Self::CallAlreadyActive => "Please end the current call before starting a new one.",
            Self::NoAvailableAgent => "All agents are currently busy or offline.",
        };
        Notice::destructive(self.to_string(), description)
    }
}

/// Identity for a call about to be started
#[derive(Debug, Clone, PartialEq)]
pub struct CallSeed {
    pub call_id: String,
    pub call_sid: String,
    pub created_at: DateTime<Utc>,
}

impl CallSeed {
    pub fn random(now: DateTime<Utc>) -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        Self {
            call_id: format!("call-{}", now.timestamp_millis()),
            call_sid: format!("CA{}", n),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

/// Toast-style message for the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}
