//! # Call Center Admin Core
//!
//! Domain types and persistence for the call center administration service.
//!
//! ## Components
//!
//! - [`Database`]: pooled SQLite handle with the embedded schema
//! - [`AgentRegistry`]: agent CRUD and status transitions
//! - [`CallLedger`]: call records, provider status updates, analytics
//! - [`SettingsStore`]: categorized settings with secret masking
//! - [`AppConfig`]: layered configuration (defaults, file, environment)
//!
//! ## Example
//!
//! ```no_run
//! use callcenter_admin_core::{AgentRegistry, AgentRequest, Database};
//!
//! # async fn example() -> callcenter_admin_core::Result<()> {
//! let db = Database::connect_in_memory().await?;
//! let agents = AgentRegistry::new(db);
//!
//! let agent = agents
//!     .create(AgentRequest {
//!         name: Some("John Doe".to_string()),
//!         phone: Some("+1234567890".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("Created agent {}", agent.id);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod calls;
pub mod config;
pub mod database;
pub mod error;
pub mod settings;
pub mod types;
pub mod validation;

pub use agents::AgentRegistry;
pub use calls::{CallLedger, StatusUpdate};
pub use config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig, TelephonyConfig};
pub use database::Database;
pub use error::{Error, Result};
pub use settings::{
    DatabaseSettings, MASK_PLACEHOLDER, Setting, SettingRequest, SettingsStore, TwilioSettings,
};
pub use types::*;
