//! Row types decoded straight from SQL results

use chrono::{DateTime, Utc};

use crate::types::{Agent, AgentStatus, Call, CallDirection, CallStatus};

/// Agent row without its skills
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbAgent {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
}

impl DbAgent {
    pub fn into_agent(self, skills: Vec<String>) -> Agent {
        Agent {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            status: self.status,
            skills,
            created_at: self.created_at,
        }
    }
}

/// Skill row
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbAgentSkill {
    pub agent_id: i64,
    pub skill: String,
}

/// Call row joined with the agent display name
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbCall {
    pub id: i64,
    pub call_sid: String,
    pub from_number: String,
    pub to_number: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub duration: i64,
    pub recording_url: Option<String>,
    pub agent_id: Option<i64>,
    pub agent_name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbCall> for Call {
    fn from(row: DbCall) -> Self {
        Call {
            id: row.id,
            call_sid: row.call_sid,
            from: row.from_number,
            to: row.to_number,
            status: row.status,
            direction: row.direction,
            duration: row.duration,
            recording_url: row.recording_url,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Settings row
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbSetting {
    pub category: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
