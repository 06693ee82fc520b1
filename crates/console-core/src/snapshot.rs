//! Immutable view of the operator console

use callcenter_admin_core::{Agent, AgentStatus, CallDirection, CallStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Call as tracked by the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleCall {
    pub id: String,
    pub call_sid: String,
    pub from: String,
    pub to: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub duration: i64,
    pub agent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Console state at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSnapshot {
    pub current_call: Option<ConsoleCall>,
    /// Newest first
    pub call_history: Vec<ConsoleCall>,
    pub agents: Vec<Agent>,
}

impl ConsoleSnapshot {
    pub fn new(agents: Vec<Agent>, call_history: Vec<ConsoleCall>) -> Self {
        Self {
            current_call: None,
            call_history,
            agents,
        }
    }

    pub fn is_call_in_progress(&self) -> bool {
        self.current_call.is_some()
    }

    pub fn agent(&self, id: i64) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// First agent in list order that can take a call
    pub fn first_available_agent(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .find(|a| a.status == AgentStatus::Available)
    }

    /// Seed data for demos: one available, one busy and one offline agent,
    /// plus three calls placed over the last three hours
    pub fn demo(now: DateTime<Utc>) -> Self {
        let agent = |id: i64, name: &str, email: &str, phone: &str, status, skills: [&str; 2]| Agent {
            id,
            name: name.to_string(),
            email: Some(email.to_string()),
            phone: phone.to_string(),
            status,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            created_at: now,
        };

        let agents = vec![
            agent(1, "John Doe", "john.doe@example.com", "+1234567890", AgentStatus::Available, ["sales", "support"]),
            agent(2, "Jane Smith", "jane.smith@example.com", "+1987654321", AgentStatus::Busy, ["technical", "billing"]),
            agent(3, "Robert Johnson", "robert.j@example.com", "+1122334455", AgentStatus::Offline, ["support", "onboarding"]),
        ];

        let history = vec![
            ConsoleCall {
                id: "1".to_string(),
                call_sid: "CA123456789".to_string(),
                from: "+1234567890".to_string(),
                to: "+9876543210".to_string(),
                status: CallStatus::Completed,
                direction: CallDirection::Inbound,
                duration: 120,
                agent_id: Some(1),
                created_at: now - Duration::hours(1),
            },
            ConsoleCall {
                id: "2".to_string(),
                call_sid: "CA987654321".to_string(),
                from: "+9876543210".to_string(),
                to: "+1234567890".to_string(),
                status: CallStatus::Completed,
                direction: CallDirection::Outbound,
                duration: 300,
                agent_id: Some(2),
                created_at: now - Duration::hours(2),
            },
            ConsoleCall {
                id: "3".to_string(),
                call_sid: "CA567891234".to_string(),
                from: "+5678912345".to_string(),
                to: "+9876543210".to_string(),
                status: CallStatus::Failed,
                direction: CallDirection::Inbound,
                duration: 0,
                agent_id: None,
                created_at: now - Duration::hours(3),
            },
        ];

        Self::new(agents, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed() {
        let snapshot = ConsoleSnapshot::demo(Utc::now());

        assert_eq!(snapshot.agents.len(), 3);
        assert_eq!(snapshot.call_history.len(), 3);
        assert!(!snapshot.is_call_in_progress());
        assert_eq!(snapshot.first_available_agent().map(|a| a.id), Some(1));
        assert_eq!(snapshot.agent(3).unwrap().status, AgentStatus::Offline);
    }
}
