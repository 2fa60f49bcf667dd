//! Lumiq API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application
//! setup for the lead submission service.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
