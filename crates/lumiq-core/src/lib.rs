//! Lumiq Core Library
//!
//! This crate provides the domain models, validation rules, configuration,
//! and error types shared across the lead capture service components.

pub mod config;
pub mod error;
pub mod models;
pub mod timefmt;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, RelayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AutoReplyPayload, NormalizedContact, NormalizedLead, NormalizedPilot, NotificationPayload,
    SubmissionKind, SubmissionRecord, SubmissionResponse, SubmissionStatus,
    SubmissionStatusResponse, SubmitContactRequest, SubmitPilotRequest,
};
pub use validation::{validate_contact, validate_pilot, FieldErrors, ValidationResult};
