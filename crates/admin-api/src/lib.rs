//! # Call Center Admin API
//!
//! HTTP surface of the call center admin service: the REST resources for
//! agents, calls and settings, the provider webhooks, and the server
//! lifecycle used by the `callcenter-server` binary.
//!
//! [`create_router`] takes an [`ApiState`], so tests can assemble the router
//! around an in-memory database and a scripted telephony provider.

pub mod api;
pub mod server;

pub use api::{ApiState, AppError, create_router};
pub use server::{StorageMode, run};
