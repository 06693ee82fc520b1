//! # Call Center Telephony Core
//!
//! Boundary between the call center admin service and the telephony
//! provider.
//!
//! - [`TelephonyProvider`] abstracts "place an outbound call"; [`TwilioClient`]
//!   implements it against the Twilio REST API
//! - [`CallDispatcher`] validates, places and records outbound calls and
//!   applies status callbacks to the call ledger
//! - [`twiml`] renders the documents returned to the provider's webhooks

pub mod dispatcher;
pub mod error;
pub mod provider;
pub mod twilio;
pub mod twiml;
pub mod webhook;

pub use dispatcher::CallDispatcher;
pub use error::{Error, Result};
pub use provider::{OutboundCall, PlacedCall, ProviderCredentials, TelephonyProvider};
pub use twilio::TwilioClient;
pub use twiml::{VoiceConfig, empty_response, voice_response};
pub use webhook::{StatusCallback, VoiceWebhook};
