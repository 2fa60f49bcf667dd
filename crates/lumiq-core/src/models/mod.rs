//! Data models for the lead capture service
//!
//! Submission requests and their normalized forms, the per-send email
//! payloads, and the submission lifecycle types.

mod forms;
mod payload;
mod status;

// Re-export all models for convenient imports
pub use forms::*;
pub use payload::*;
pub use status::*;
