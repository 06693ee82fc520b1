//! Pure console transitions
//!
//! Each operation inspects a snapshot and returns the events it implies (or a
//! [`Rejection`]); [`apply`] folds one event into a new snapshot. Nothing here
//! mutates its input.

use callcenter_admin_core::{AgentStatus, CallDirection, CallStatus};

use crate::events::{CallSeed, ConsoleEvent, Rejection};
use crate::snapshot::{ConsoleCall, ConsoleSnapshot};

/// Start an outbound call to `number` with the first available agent
pub fn start_call(
    snapshot: &ConsoleSnapshot,
    number: &str,
    seed: CallSeed,
) -> Result<Vec<ConsoleEvent>, Rejection> {
    if snapshot.is_call_in_progress() {
        return Err(Rejection::CallAlreadyActive);
    }

    let agent = snapshot
        .first_available_agent()
        .ok_or(Rejection::NoAvailableAgent)?;

    let call = ConsoleCall {
        id: seed.call_id,
        call_sid: seed.call_sid,
        from: agent.phone.clone(),
        to: number.to_string(),
        status: CallStatus::InProgress,
        direction: CallDirection::Outbound,
        duration: 0,
        agent_id: Some(agent.id),
        created_at: seed.created_at,
    };

    Ok(vec![
        ConsoleEvent::AgentStatusChanged {
            agent_id: agent.id,
            status: AgentStatus::Busy,
        },
        ConsoleEvent::CallStarted { call },
    ])
}

/// End the active call; no events when there is none
pub fn end_call(snapshot: &ConsoleSnapshot, duration: i64) -> Vec<ConsoleEvent> {
    let Some(current) = &snapshot.current_call else {
        return Vec::new();
    };

    let ended = ConsoleCall {
        status: CallStatus::Completed,
        duration,
        ..current.clone()
    };

    let mut events = vec![ConsoleEvent::CallEnded { call: ended }];
    if let Some(agent_id) = current.agent_id {
        events.push(ConsoleEvent::AgentStatusChanged {
            agent_id,
            status: AgentStatus::Available,
        });
    }
    events
}

/// Overwrite an agent's status
pub fn set_agent_status(agent_id: i64, status: AgentStatus) -> ConsoleEvent {
    ConsoleEvent::AgentStatusChanged { agent_id, status }
}

/// Fold one event into a snapshot
pub fn apply(snapshot: &ConsoleSnapshot, event: &ConsoleEvent) -> ConsoleSnapshot {
    let mut next = snapshot.clone();
    match event {
        ConsoleEvent::AgentStatusChanged { agent_id, status } => {
            if let Some(agent) = next.agents.iter_mut().find(|a| a.id == *agent_id) {
                agent.status = *status;
            }
        }
        ConsoleEvent::CallStarted { call } => {
            next.current_call = Some(call.clone());
        }
        ConsoleEvent::CallEnded { call } => {
            next.call_history.insert(0, call.clone());
            next.current_call = None;
        }
    }
    next
}

/// Fold a sequence of events
pub fn apply_all<'a>(
    snapshot: &ConsoleSnapshot,
    events: impl IntoIterator<Item = &'a ConsoleEvent>,
) -> ConsoleSnapshot {
    events
        .into_iter()
        .fold(snapshot.clone(), |acc, event| apply(&acc, event))
}
