//! Dashboard statistics derived from a console snapshot

use callcenter_admin_core::{AgentStatus, CallStatus};
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::snapshot::ConsoleSnapshot;

/// Statuses shown as cards even when their count is zero
const HEADLINE_STATUSES: [CallStatus; 4] = [
    CallStatus::Completed,
    CallStatus::Failed,
    CallStatus::NoAnswer,
    CallStatus::Busy,
];

const ALL_STATUSES: [CallStatus; 9] = [
    CallStatus::Completed,
    CallStatus::Failed,
    CallStatus::NoAnswer,
    CallStatus::Busy,
    CallStatus::Queued,
    CallStatus::Initiated,
    CallStatus::Ringing,
    CallStatus::InProgress,
    CallStatus::Canceled,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsPerHour {
    pub hour: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsPerAgent {
    pub agent_id: i64,
    pub agent_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusCount {
    pub status: CallStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_calls: usize,
    /// Agents currently marked busy
    pub active_calls: usize,
    pub available_agents: usize,
    pub total_agents: usize,
    pub calls_today: usize,
    /// Mean duration of calls that connected, in seconds
    pub average_duration: f64,
    pub calls_per_hour: Vec<CallsPerHour>,
    pub calls_per_agent: Vec<CallsPerAgent>,
    pub call_statuses: Vec<CallStatusCount>,
}

/// Compute dashboard figures. `now` fixes the current UTC day.
pub fn dashboard_stats(snapshot: &ConsoleSnapshot, now: DateTime<Utc>) -> DashboardStats {
    let history = &snapshot.call_history;

    let count_agents = |status: AgentStatus| snapshot.agents.iter().filter(|a| a.status == status).count();

    let mut per_hour = [0usize; 24];
    for call in history {
        per_hour[call.created_at.hour() as usize] += 1;
    }

    let connected: Vec<i64> = history.iter().map(|c| c.duration).filter(|d| *d > 0).collect();
    let average_duration = if connected.is_empty() {
        0.0
    } else {
        connected.iter().sum::<i64>() as f64 / connected.len() as f64
    };

    let call_statuses = ALL_STATUSES
        .iter()
        .map(|status| CallStatusCount {
            status: *status,
            count: history.iter().filter(|c| c.status == *status).count(),
        })
        .filter(|s| s.count > 0 || HEADLINE_STATUSES.contains(&s.status))
        .collect();

    DashboardStats {
        total_calls: history.len(),
        active_calls: count_agents(AgentStatus::Busy),
        available_agents: count_agents(AgentStatus::Available),
        total_agents: snapshot.agents.len(),
        calls_today: history
            .iter()
            .filter(|c| c.created_at.date_naive() == now.date_naive())
            .count(),
        average_duration,
        calls_per_hour: per_hour
            .iter()
            .enumerate()
            .map(|(hour, count)| CallsPerHour {
                hour: hour as u32,
                count: *count,
            })
            .collect(),
        calls_per_agent: snapshot
            .agents
            .iter()
            .map(|agent| CallsPerAgent {
                agent_id: agent.id,
                agent_name: agent.name.clone(),
                count: history.iter().filter(|c| c.agent_id == Some(agent.id)).count(),
            })
            .collect(),
        call_statuses,
    }
}
