//! # Call Center Console Core
//!
//! State behind the operator console: who is available, which call is
//! active, and what happened recently.
//!
//! State is an immutable [`ConsoleSnapshot`]. The functions in
//! [`transitions`] turn an operation into [`ConsoleEvent`]s (or a
//! [`Rejection`]) and fold events into the next snapshot. [`ConsoleStore`]
//! wraps this in a lock, keeps the event log and broadcasts updates and
//! [`Notice`]s. [`dashboard_stats`] derives the dashboard figures.
//!
//! ```
//! use callcenter_console_core::ConsoleStore;
//!
//! let store = ConsoleStore::demo();
//! let snapshot = store.start_call("+15551112222").unwrap();
//! assert!(snapshot.is_call_in_progress());
//!
//! let ended = store.end_call().unwrap();
//! assert!(ended.duration >= 30);
//! ```

pub mod events;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod transitions;

pub use events::{CallSeed, ConsoleEvent, Notice, Rejection, Severity};
pub use snapshot::{ConsoleCall, ConsoleSnapshot};
pub use stats::{CallStatusCount, CallsPerAgent, CallsPerHour, DashboardStats, dashboard_stats};
pub use store::{ConsoleStore, ConsoleUpdate};
