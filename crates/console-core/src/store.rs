//! Console store
//!
//! Holds the current snapshot and the event log behind a lock. Every accepted
//! transition replaces the snapshot with a new `Arc`, so readers keep a
//! consistent view for as long as they hold one. Updates are broadcast to
//! subscribers together with operator notices.

use std::sync::Arc;

use callcenter_admin_core::{Agent, AgentStatus};
use chrono::Utc;
use parking_lot::RwLock;
use rand::Rng;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::events::{CallSeed, ConsoleEvent, Notice, Rejection};
use crate::snapshot::{ConsoleCall, ConsoleSnapshot};
use crate::transitions;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Ended calls get a simulated duration in this range, in seconds
const SIMULATED_DURATION_SECS: std::ops::RangeInclusive<i64> = 30..=330;

/// Published to console subscribers
#[derive(Debug, Clone)]
pub enum ConsoleUpdate {
    Snapshot(Arc<ConsoleSnapshot>),
    Notice(Notice),
}

struct ConsoleState {
    snapshot: Arc<ConsoleSnapshot>,
    events: Vec<ConsoleEvent>,
}

/// Shared operator console state
pub struct ConsoleStore {
    state: RwLock<ConsoleState>,
    updates: broadcast::Sender<ConsoleUpdate>,
}

impl ConsoleStore {
    pub fn new(initial: ConsoleSnapshot) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(ConsoleState {
                snapshot: Arc::new(initial),
                events: Vec::new(),
            }),
            updates,
        }
    }

    /// Store seeded with the demo agents and call history
    pub fn demo() -> Self {
        Self::new(ConsoleSnapshot::demo(Utc::now()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleUpdate> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> Arc<ConsoleSnapshot> {
        self.state.read().snapshot.clone()
    }

    pub fn current_call(&self) -> Option<ConsoleCall> {
        self.state.read().snapshot.current_call.clone()
    }

    pub fn call_history(&self) -> Vec<ConsoleCall> {
        self.state.read().snapshot.call_history.clone()
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.state.read().snapshot.agents.clone()
    }

    pub fn is_call_in_progress(&self) -> bool {
        self.state.read().snapshot.is_call_in_progress()
    }

    /// Every accepted event, oldest first
    pub fn events(&self) -> Vec<ConsoleEvent> {
        self.state.read().events.clone()
    }

    /// Start a call to `number` with a random call id. Returns the snapshot
    /// holding the new current call.
    pub fn start_call(&self, number: &str) -> Result<Arc<ConsoleSnapshot>, Rejection> {
        self.start_call_with(number, CallSeed::random(Utc::now()))
    }

    pub fn start_call_with(&self, number: &str, seed: CallSeed) -> Result<Arc<ConsoleSnapshot>, Rejection> {
        let number = number.trim();
        let outcome = {
            let mut state = self.state.write();
            transitions::start_call(&state.snapshot, number, seed).map(|events| commit(&mut state, events))
        };

        let snapshot = match outcome {
            Ok(snapshot) => snapshot,
            Err(rejection) => {
                warn!("Console call to {} rejected: {}", number, rejection);
                self.publish(ConsoleUpdate::Notice(rejection.notice()));
                return Err(rejection);
            }
        };

        if let Some(call) = &snapshot.current_call {
            let agent_name = call
                .agent_id
                .and_then(|id| snapshot.agent(id))
                .map(|a| a.name.clone())
                .unwrap_or_default();

            info!("📞 Console call {} to {} started with {}", call.call_sid, number, agent_name);
            self.publish(ConsoleUpdate::Snapshot(snapshot.clone()));
            self.publish(ConsoleUpdate::Notice(Notice::info(
                "Call initiated",
                format!("Calling {} with agent {}", number, agent_name),
            )));
        }
        Ok(snapshot)
    }

    /// End the active call with a simulated duration. Returns the completed
    /// call, or `None` when no call was active.
    pub fn end_call(&self) -> Option<ConsoleCall> {
        let duration = rand::thread_rng().gen_range(SIMULATED_DURATION_SECS);
        self.end_call_with(duration)
    }

    pub fn end_call_with(&self, duration: i64) -> Option<ConsoleCall> {
        let snapshot = {
            let mut state = self.state.write();
            let events = transitions::end_call(&state.snapshot, duration);
            if events.is_empty() {
                debug!("End call requested with no active call");
                return None;
            }
            commit(&mut state, events)
        };

        let ended = snapshot.call_history.first().cloned()?;

        info!("📴 Console call {} ended after {}s", ended.call_sid, ended.duration);
        self.publish(ConsoleUpdate::Snapshot(snapshot));
        self.publish(ConsoleUpdate::Notice(Notice::info(
            "Call ended",
            format!("Call to {} has ended.", ended.to),
        )));
        Some(ended)
    }

    /// Overwrite an agent's status
    pub fn set_agent_status(&self, agent_id: i64, status: AgentStatus) {
        let snapshot = {
            let mut state = self.state.write();
            commit(&mut state, vec![transitions::set_agent_status(agent_id, status)])
        };

        debug!("Console agent {} is now {}", agent_id, status);
        self.publish(ConsoleUpdate::Snapshot(snapshot));
    }

    fn publish(&self, update: ConsoleUpdate) {
        // No subscribers is fine
        let _ = self.updates.send(update);
    }
}

/// Fold events into the state and append them to the log
fn commit(state: &mut ConsoleState, events: Vec<ConsoleEvent>) -> Arc<ConsoleSnapshot> {
    let next = Arc::new(transitions::apply_all(&state.snapshot, &events));
    state.snapshot = next.clone();
    state.events.extend(events);
    next
}
