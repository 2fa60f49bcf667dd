//! Lumiq Relay Library
//!
//! Infrastructure for the lead capture service: the transactional-email
//! relay client, the two-step submission dispatcher, and the in-memory
//! submission status store.

pub mod client;
pub mod dispatcher;
pub mod status_store;

pub use client::{HttpRelayTransport, RelayError, RelayReceipt, RelayTransport};
pub use dispatcher::{DispatchOutcome, LeadDispatcher};
pub use status_store::StatusStore;
