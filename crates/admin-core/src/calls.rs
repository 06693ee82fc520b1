//! Call ledger
//!
//! Append-mostly record of calls placed or received. Rows are created at
//! initiation and later patched by provider status callbacks, which may
//! overwrite any status with any other.

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteArguments;
use sqlx::{Arguments, Sqlite};
use tracing::{debug, info};
use validator::Validate;

use crate::database::{Database, DbCall};
use crate::types::{
    AgentCallCount, AgentStatus, AnalyticsQuery, AnalyticsSummary, Call, CallDirection,
    CallFilter, CallNotesRequest, CallStatus, DirectionCount, NewCall, StatusCount,
};
use crate::{Error, Result};

const CALL_SELECT: &str = "SELECT c.id, c.call_sid, c.from_number, c.to_number, c.status, c.direction, \
     c.duration, c.recording_url, c.agent_id, a.name AS agent_name, c.notes, c.created_at \
     FROM calls c LEFT JOIN agents a ON a.id = c.agent_id";

const MAX_LIST_LIMIT: u32 = 1000;

/// Call store backed by the call center database
#[derive(Clone, Debug)]
pub struct CallLedger {
    db: Database,
}

/// Outcome of applying a provider status callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied,
    UnknownCall,
}

impl CallLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Calls newest first, joined with the agent name
    pub async fn list(&self, filter: CallFilter) -> Result<Vec<Call>> {
        let mut sql = format!("{} WHERE 1=1", CALL_SELECT);
        let mut args = SqliteArguments::default();

        if let Some(status) = filter.status {
            sql.push_str(" AND c.status = ?");
            add(&mut args, status)?;
        }
        if let Some(direction) = filter.direction {
            sql.push_str(" AND c.direction = ?");
            add(&mut args, direction)?;
        }
        if let Some(agent_id) = filter.agent_id {
            sql.push_str(" AND c.agent_id = ?");
            add(&mut args, agent_id)?;
        }

        sql.push_str(" ORDER BY c.created_at DESC, c.id DESC");

        if let Some(limit) = filter.limit {
            if limit > MAX_LIST_LIMIT {
                return Err(Error::validation(format!(
                    "Limit must not exceed {}",
                    MAX_LIST_LIMIT
                )));
            }
            sql.push_str(" LIMIT ?");
            add(&mut args, limit as i64)?;
        }

        let rows: Vec<DbCall> = sqlx::query_as_with(&sql, args)
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(Call::from).collect())
    }

    /// Look up one call
    pub async fn get(&self, id: i64) -> Result<Call> {
        let row: Option<DbCall> = sqlx::query_as(&format!("{} WHERE c.id = ?", CALL_SELECT))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(Call::from)
            .ok_or_else(|| Error::not_found(format!("Call {} not found", id)))
    }

    /// Look up a call by its provider identifier
    pub async fn find_by_sid(&self, call_sid: &str) -> Result<Option<Call>> {
        let row: Option<DbCall> = sqlx::query_as(&format!("{} WHERE c.call_sid = ?", CALL_SELECT))
            .bind(call_sid)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(Call::from))
    }

    /// Insert a call row
    pub async fn record(&self, call: NewCall) -> Result<Call> {
        let mut tx = self.db.pool().begin().await?;
        let id = insert_call(&mut tx, &call).await?;
        tx.commit().await?;

        debug!("Call {} recorded as {}", call.call_sid, call.status);
        self.get(id).await
    }

    /// Insert an outbound call and, when it is linked to an agent, mark that
    /// agent busy. Both writes commit together or not at all.
    pub async fn record_outbound(&self, call: NewCall) -> Result<Call> {
        let mut tx = self.db.pool().begin().await?;

        let id = insert_call(&mut tx, &call).await?;

        if let Some(agent_id) = call.agent_id {
            let result = sqlx::query("UPDATE agents SET status = ? WHERE id = ?")
                .bind(AgentStatus::Busy)
                .bind(agent_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(Error::not_found(format!("Agent {} not found", agent_id)));
            }
        }

        tx.commit().await?;

        info!(
            "Outbound call {} to {} recorded (agent {:?})",
            call.call_sid, call.to, call.agent_id
        );
        self.get(id).await
    }

    /// Replace the free-text notes of a call
    pub async fn update_notes(&self, id: i64, request: CallNotesRequest) -> Result<Call> {
        request.validate()?;

        let result = sqlx::query("UPDATE calls SET notes = ? WHERE id = ?")
            .bind(&request.notes)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Call {} not found", id)));
        }

        self.get(id).await
    }

    /// Remove a call record
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM calls WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Call {} not found", id)));
        }

        info!("Call {} deleted", id);
        Ok(())
    }

    /// Overwrite the status of the call with the given provider identifier.
    /// Duration and recording are only written when supplied.
    pub async fn apply_status_update(
        &self,
        call_sid: &str,
        status: CallStatus,
        duration: Option<i64>,
        recording_url: Option<&str>,
    ) -> Result<StatusUpdate> {
        if let Some(duration) = duration {
            if duration < 0 {
                return Err(Error::validation("Call duration must not be negative"));
            }
        }

        let result = sqlx::query(
            "UPDATE calls SET status = ?, \
                 duration = COALESCE(?, duration), \
                 recording_url = COALESCE(?, recording_url) \
             WHERE call_sid = ?",
        )
        .bind(status)
        .bind(duration)
        .bind(recording_url)
        .bind(call_sid)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(StatusUpdate::UnknownCall);
        }

        debug!("Call {} status overwritten with {}", call_sid, status);
        Ok(StatusUpdate::Applied)
    }

    /// Aggregate call statistics over an optional inclusive date range
    pub async fn analytics_summary(&self, query: AnalyticsQuery) -> Result<AnalyticsSummary> {
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            if start > end {
                return Err(Error::validation("startDate must not be after endDate"));
            }
        }

        let range = DateRange {
            start: query.start_date,
            end: query.end_date,
        };
        let pool = self.db.pool();

        let (clause, args) = range.where_clause("1=1")?;
        let total_calls: i64 =
            sqlx::query_scalar_with(&format!("SELECT COUNT(*) FROM calls c WHERE {}", clause), args)
                .fetch_one(pool)
                .await?;

        let (clause, args) = range.where_clause("1=1")?;
        let by_status: Vec<(CallStatus, i64)> = sqlx::query_as_with(
            &format!(
                "SELECT c.status, COUNT(*) FROM calls c WHERE {} GROUP BY c.status ORDER BY COUNT(*) DESC, c.status",
                clause
            ),
            args,
        )
        .fetch_all(pool)
        .await?;

        let (clause, args) = range.where_clause("1=1")?;
        let by_direction: Vec<(CallDirection, i64)> = sqlx::query_as_with(
            &format!(
                "SELECT c.direction, COUNT(*) FROM calls c WHERE {} GROUP BY c.direction ORDER BY c.direction",
                clause
            ),
            args,
        )
        .fetch_all(pool)
        .await?;

        let (clause, args) = range.where_clause("c.duration > 0")?;
        let average_duration: Option<f64> =
            sqlx::query_scalar_with(&format!("SELECT AVG(c.duration) FROM calls c WHERE {}", clause), args)
                .fetch_one(pool)
                .await?;

        let (clause, args) = range.where_clause("c.agent_id IS NOT NULL")?;
        let by_agent: Vec<(i64, String, i64)> = sqlx::query_as_with(
            &format!(
                "SELECT c.agent_id, a.name, COUNT(*) AS call_count \
                 FROM calls c JOIN agents a ON a.id = c.agent_id \
                 WHERE {} \
                 GROUP BY c.agent_id, a.name \
                 ORDER BY call_count DESC, c.agent_id ASC",
                clause
            ),
            args,
        )
        .fetch_all(pool)
        .await?;

        Ok(AnalyticsSummary {
            total_calls,
            by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_direction: by_direction
                .into_iter()
                .map(|(direction, count)| DirectionCount { direction, count })
                .collect(),
            average_duration: average_duration.unwrap_or(0.0),
            by_agent: by_agent
                .into_iter()
                .map(|(agent_id, agent_name, count)| AgentCallCount {
                    agent_id,
                    agent_name,
                    count,
                })
                .collect(),
        })
    }
}

/// Inclusive day range applied to `calls.created_at`
struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    fn where_clause(&self, base: &str) -> Result<(String, SqliteArguments<'static>)> {
        let mut clause = base.to_string();
        let mut args = SqliteArguments::default();

        if let Some(start) = self.start {
            clause.push_str(" AND date(c.created_at) >= ?");
            add(&mut args, start.format("%Y-%m-%d").to_string())?;
        }
        if let Some(end) = self.end {
            clause.push_str(" AND date(c.created_at) <= ?");
            add(&mut args, end.format("%Y-%m-%d").to_string())?;
        }

        Ok((clause, args))
    }
}

fn add<'q, T>(args: &mut SqliteArguments<'q>, value: T) -> Result<()>
where
    T: 'q + sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite>,
{
    args.add(value)
        .map_err(|e| Error::internal(format!("Failed to bind query argument: {}", e)))
}

async fn insert_call(tx: &mut sqlx::Transaction<'_, Sqlite>, call: &NewCall) -> Result<i64> {
    if call.duration < 0 {
        return Err(Error::validation("Call duration must not be negative"));
    }

    let result = sqlx::query(
        "INSERT INTO calls (call_sid, from_number, to_number, status, direction, duration, \
             recording_url, agent_id, notes, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&call.call_sid)
    .bind(&call.from)
    .bind(&call.to)
    .bind(call.status)
    .bind(call.direction)
    .bind(call.duration)
    .bind(&call.recording_url)
    .bind(call.agent_id)
    .bind(&call.notes)
    .bind(call.created_at.unwrap_or_else(Utc::now))
    .execute(&mut **tx)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            Error::conflict(format!("Call {} already recorded", call.call_sid))
        }
        _ => Error::Database(e),
    })?;

    Ok(result.last_insert_rowid())
}
