//! In-memory submission status store.
//!
//! One record per mounted form instance, keyed by the client-generated
//! `client_ref`. Records are overwritten on re-submit and evicted on a
//! TTL once settled, so the map stays bounded without persistence.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use lumiq_core::models::{SubmissionKind, SubmissionRecord, SubmissionStatus};
use lumiq_core::{AppError, FieldErrors};

#[derive(Default)]
pub struct StatusStore {
    records: RwLock<HashMap<Uuid, SubmissionRecord>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new submission attempt. Refuses when the previous attempt
    /// for the same form instance has not settled yet; a settled record is
    /// overwritten with a fresh `Submitting` one.
    pub async fn begin(&self, client_ref: Uuid, kind: SubmissionKind) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.get(&client_ref) {
            if !existing.status.is_settled() {
                return Err(AppError::SubmissionInFlight);
            }
        }
        records.insert(client_ref, SubmissionRecord::new(client_ref, kind));
        Ok(())
    }

    /// Validation failure: the form returns to `Idle` carrying the per-field
    /// messages, ready for an immediate corrected re-submit.
    pub async fn settle_invalid(&self, client_ref: Uuid, errors: FieldErrors) {
        self.settle(client_ref, |record| {
            record.status = SubmissionStatus::Idle;
            record.field_errors = errors;
            record.failure_reason = None;
            record.auto_reply_delivered = None;
        })
        .await;
    }

    pub async fn settle_succeeded(&self, client_ref: Uuid, auto_reply_delivered: bool) {
        self.settle(client_ref, |record| {
            record.status = SubmissionStatus::Succeeded;
            record.field_errors = FieldErrors::new();
            record.failure_reason = None;
            record.auto_reply_delivered = Some(auto_reply_delivered);
        })
        .await;
    }

    pub async fn settle_failed(
        &self,
        client_ref: Uuid,
        reason: String,
        auto_reply_delivered: bool,
    ) {
        self.settle(client_ref, |record| {
            record.status = SubmissionStatus::Failed;
            record.field_errors = FieldErrors::new();
            record.failure_reason = Some(reason);
            record.auto_reply_delivered = Some(auto_reply_delivered);
        })
        .await;
    }

    pub async fn get(&self, client_ref: Uuid) -> Option<SubmissionRecord> {
        self.records.read().await.get(&client_ref).cloned()
    }

    /// Number of tracked form instances, reported by the health endpoint.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Drops settled records older than `ttl`. In-flight records are always
    /// kept so an active submission cannot lose its slot. Returns the number
    /// of evicted records.
    pub async fn evict_older_than(&self, ttl: Duration) -> usize {
        let max_age_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let now = Utc::now();

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| {
            record.status == SubmissionStatus::Submitting
                || now.signed_duration_since(record.updated_at).num_seconds() < max_age_seconds
        });
        let evicted = before - records.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted settled submission records");
        }
        evicted
    }

    async fn settle(&self, client_ref: Uuid, apply: impl FnOnce(&mut SubmissionRecord)) {
        let mut records = self.records.write().await;
        match records.get_mut(&client_ref) {
            Some(record) => {
                apply(record);
                record.updated_at = Utc::now();
            }
            None => {
                // Happens when the eviction task raced a very slow dispatch.
                tracing::warn!(%client_ref, "Settle requested for unknown submission, ignoring");
            }
        }
    }
}
