use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::SubmissionKind;
use crate::validation::FieldErrors;

/// Submission lifecycle status for one form instance.
///
/// `Failed` is reserved for delivery failures after a network attempt;
/// validation failures settle back to `Idle` with the field-error map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    /// Settled states accept a new submit; `Submitting` refuses one.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SubmissionStatus::Submitting)
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStatus::Idle => write!(f, "idle"),
            SubmissionStatus::Submitting => write!(f, "submitting"),
            SubmissionStatus::Succeeded => write!(f, "succeeded"),
            SubmissionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Tracked state for one mounted form instance.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub client_ref: Uuid,
    pub kind: SubmissionKind,
    pub status: SubmissionStatus,
    /// Populated only when the last submit failed validation.
    pub field_errors: FieldErrors,
    /// Populated only when `status` is `Failed`.
    pub failure_reason: Option<String>,
    /// Populated once the submission settles after dispatch.
    pub auto_reply_delivered: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(client_ref: Uuid, kind: SubmissionKind) -> Self {
        Self {
            client_ref,
            kind,
            status: SubmissionStatus::Submitting,
            field_errors: FieldErrors::new(),
            failure_reason: None,
            auto_reply_delivered: None,
            updated_at: Utc::now(),
        }
    }
}

/// Response for a successfully delivered submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub client_ref: Uuid,
    pub status: SubmissionStatus,
    pub auto_reply_delivered: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Response for the status polling endpoint. An unknown `client_ref` reports
/// `Idle`: a fresh form instance has no history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionStatusResponse {
    pub client_ref: Uuid,
    pub status: SubmissionStatus,
    pub field_errors: FieldErrors,
    pub failure_reason: Option<String>,
    pub auto_reply_delivered: Option<bool>,
}

impl SubmissionStatusResponse {
    /// The report for a `client_ref` the store has never seen.
    pub fn idle(client_ref: Uuid) -> Self {
        Self {
            client_ref,
            status: SubmissionStatus::Idle,
            field_errors: FieldErrors::new(),
            failure_reason: None,
            auto_reply_delivered: None,
        }
    }
}

impl From<SubmissionRecord> for SubmissionStatusResponse {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            client_ref: record.client_ref,
            status: record.status,
            field_errors: record.field_errors,
            failure_reason: record.failure_reason,
            auto_reply_delivered: record.auto_reply_delivered,
        }
    }
}
