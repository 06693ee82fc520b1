//! Agent registry
//!
//! CRUD and status transitions for agent records. Skill tags live in the
//! `agent_skills` table, one row per tag, and are folded back into
//! [`Agent::skills`] on every read.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};
use validator::Validate;

use crate::database::{Database, DbAgent, DbAgentSkill};
use crate::types::{Agent, AgentRequest, AgentStatus};
use crate::validation::normalize_skills;
use crate::{Error, Result};

const AGENT_COLUMNS: &str = "id, name, email, phone, status, created_at";

/// Agent store backed by the call center database
#[derive(Clone, Debug)]
pub struct AgentRegistry {
    db: Database,
}

/// Validated, normalized agent fields ready to be written
struct AgentFields {
    name: String,
    email: Option<String>,
    phone: String,
    status: Option<AgentStatus>,
    skills: Vec<String>,
}

impl AgentFields {
    fn from_request(request: AgentRequest) -> Result<Self> {
        let request = request.normalized();
        request.validate()?;

        // Both are guaranteed present by `required` above
        let name = request.name.ok_or_else(|| Error::validation("Name is required"))?;
        let phone = request.phone.ok_or_else(|| Error::validation("Phone is required"))?;

        Ok(Self {
            name,
            email: request.email,
            phone,
            status: request.status,
            skills: normalize_skills(&request.skills),
        })
    }
}

impl AgentRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All agents ordered by id
    pub async fn list(&self) -> Result<Vec<Agent>> {
        let rows: Vec<DbAgent> =
            sqlx::query_as(&format!("SELECT {} FROM agents ORDER BY id", AGENT_COLUMNS))
                .fetch_all(self.db.pool())
                .await?;

        let skill_rows: Vec<DbAgentSkill> =
            sqlx::query_as("SELECT agent_id, skill FROM agent_skills ORDER BY id")
                .fetch_all(self.db.pool())
                .await?;

        let mut skills: HashMap<i64, Vec<String>> = HashMap::new();
        for row in skill_rows {
            skills.entry(row.agent_id).or_default().push(row.skill);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let agent_skills = skills.remove(&row.id).unwrap_or_default();
                row.into_agent(agent_skills)
            })
            .collect())
    }

    /// Look up one agent
    pub async fn get(&self, id: i64) -> Result<Agent> {
        self.find(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Agent {} not found", id)))
    }

    /// Look up one agent, `None` when absent
    pub async fn find(&self, id: i64) -> Result<Option<Agent>> {
        let row: Option<DbAgent> =
            sqlx::query_as(&format!("SELECT {} FROM agents WHERE id = ?", AGENT_COLUMNS))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;

        match row {
            Some(row) => {
                let skills = self.skills_for(id).await?;
                Ok(Some(row.into_agent(skills)))
            }
            None => Ok(None),
        }
    }

    /// Onboard an agent; status defaults to offline
    pub async fn create(&self, request: AgentRequest) -> Result<Agent> {
        let fields = AgentFields::from_request(request)?;
        let status = fields.status.unwrap_or_default();
        let created_at = Utc::now();

        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO agents (name, email, phone, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(status)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        insert_skills(&mut tx, id, &fields.skills).await?;

        tx.commit().await?;

        info!("Agent {} ({}) created as {}", id, fields.name, status);
        Ok(Agent {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            status,
            skills: fields.skills,
            created_at,
        })
    }

    /// Replace the mutable fields of an agent. Identity and creation time are
    /// kept; a missing status keeps the current one.
    pub async fn update(&self, id: i64, request: AgentRequest) -> Result<Agent> {
        let fields = AgentFields::from_request(request)?;

        let mut tx = self.db.pool().begin().await?;

        let current: Option<DbAgent> =
            sqlx::query_as(&format!("SELECT {} FROM agents WHERE id = ?", AGENT_COLUMNS))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or_else(|| Error::not_found(format!("Agent {} not found", id)))?;

        let status = fields.status.unwrap_or(current.status);

        sqlx::query("UPDATE agents SET name = ?, email = ?, phone = ?, status = ? WHERE id = ?")
            .bind(&fields.name)
            .bind(&fields.email)
            .bind(&fields.phone)
            .bind(status)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM agent_skills WHERE agent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_skills(&mut tx, id, &fields.skills).await?;

        tx.commit().await?;

        info!("Agent {} updated", id);
        Ok(Agent {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            status,
            skills: fields.skills,
            created_at: current.created_at,
        })
    }

    /// Remove an agent and its skills
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM agent_skills WHERE agent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back
            return Err(Error::not_found(format!("Agent {} not found", id)));
        }

        tx.commit().await?;
        info!("Agent {} deleted", id);
        Ok(())
    }

    /// Overwrite only the status field
    pub async fn set_status(&self, id: i64, status: AgentStatus) -> Result<Agent> {
        let result = sqlx::query("UPDATE agents SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Agent {} not found", id)));
        }

        debug!("Agent {} status updated to {}", id, status);
        self.get(id).await
    }

    /// First agent (lowest id) currently available
    pub async fn first_available(&self) -> Result<Option<Agent>> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM agents WHERE status = ? ORDER BY id LIMIT 1")
                .bind(AgentStatus::Available)
                .fetch_optional(self.db.pool())
                .await?;

        match id {
            Some(id) => self.find(id).await,
            None => Ok(None),
        }
    }

    async fn skills_for(&self, id: i64) -> Result<Vec<String>> {
        let skills: Vec<String> =
            sqlx::query_scalar("SELECT skill FROM agent_skills WHERE agent_id = ? ORDER BY id")
                .bind(id)
                .fetch_all(self.db.pool())
                .await?;
        Ok(skills)
    }
}

async fn insert_skills(tx: &mut Transaction<'_, Sqlite>, agent_id: i64, skills: &[String]) -> Result<()> {
    for skill in skills {
        sqlx::query("INSERT INTO agent_skills (agent_id, skill) VALUES (?, ?)")
            .bind(agent_id)
            .bind(skill)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
