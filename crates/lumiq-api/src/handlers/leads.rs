//! Lead submission handlers
//!
//! Both forms run the same saga: register the attempt, validate, dispatch the
//! two relay sends, settle the record. Validation failures settle back to
//! idle with per-field messages; only a failed business notification marks
//! the submission failed.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use lumiq_core::models::{
    NormalizedLead, SubmissionKind, SubmissionResponse, SubmissionStatus, SubmissionStatusResponse,
    SubmitContactRequest, SubmitPilotRequest,
};
use lumiq_core::validation::{validate_contact, validate_pilot, ValidationResult};
use lumiq_core::{AppError, ErrorMetadata};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Submit a contact form lead. Validates the body, then relays it as two
/// emails: a best-effort acknowledgment to the submitter, then the required
/// notification to the sales inbox.
#[utoipa::path(
    post,
    path = "/api/v0/leads/contact",
    tag = "leads",
    request_body = SubmitContactRequest,
    responses(
        (status = 200, description = "Submission delivered", body = SubmissionResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "A submission for this form is already in flight", body = ErrorResponse),
        (status = 422, description = "Validation failed, field_errors lists one message per field", body = ErrorResponse),
        (status = 502, description = "The relay rejected the notification", body = ErrorResponse),
        (status = 504, description = "The relay did not respond in time", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(client_ref = %request.0.client_ref))]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    request: ValidatedJson<SubmitContactRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ValidatedJson(request) = request;
    let client_ref = request.client_ref;

    state
        .status_store
        .begin(client_ref, SubmissionKind::Contact)
        .await
        .map_err(HttpAppError::from)?;

    let contact = match validate_contact(&request) {
        ValidationResult::Valid(contact) => contact,
        ValidationResult::Invalid(errors) => {
            state.status_store.settle_invalid(client_ref, errors.clone()).await;
            return Err(HttpAppError::from(AppError::Validation(errors)));
        }
    };

    dispatch_and_settle(&state, client_ref, NormalizedLead::Contact(contact)).await
}

/// Submit a pilot program application. Same two-step relay flow as the
/// contact form, with the pilot constraint set (consent required, optional
/// phone and SMB count).
#[utoipa::path(
    post,
    path = "/api/v0/leads/pilot",
    tag = "leads",
    request_body = SubmitPilotRequest,
    responses(
        (status = 200, description = "Submission delivered", body = SubmissionResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "A submission for this form is already in flight", body = ErrorResponse),
        (status = 422, description = "Validation failed, field_errors lists one message per field", body = ErrorResponse),
        (status = 502, description = "The relay rejected the notification", body = ErrorResponse),
        (status = 504, description = "The relay did not respond in time", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(client_ref = %request.0.client_ref))]
pub async fn submit_pilot(
    State(state): State<Arc<AppState>>,
    request: ValidatedJson<SubmitPilotRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ValidatedJson(request) = request;
    let client_ref = request.client_ref;

    state
        .status_store
        .begin(client_ref, SubmissionKind::Pilot)
        .await
        .map_err(HttpAppError::from)?;

    let pilot = match validate_pilot(&request) {
        ValidationResult::Valid(pilot) => pilot,
        ValidationResult::Invalid(errors) => {
            state.status_store.settle_invalid(client_ref, errors.clone()).await;
            return Err(HttpAppError::from(AppError::Validation(errors)));
        }
    };

    dispatch_and_settle(&state, client_ref, NormalizedLead::Pilot(pilot)).await
}

/// Shared tail of both submit handlers: run the two-step dispatch, settle the
/// record on the outcome, and translate a failed notification into the HTTP
/// error the frontend shows.
async fn dispatch_and_settle(
    state: &AppState,
    client_ref: Uuid,
    lead: NormalizedLead,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let outcome = state.dispatcher.dispatch(&lead).await;
    let auto_reply_delivered = outcome.auto_reply_delivered();

    match outcome.notification {
        Ok(_) => {
            state
                .status_store
                .settle_succeeded(client_ref, auto_reply_delivered)
                .await;
            Ok(Json(SubmissionResponse {
                client_ref,
                status: SubmissionStatus::Succeeded,
                auto_reply_delivered,
                submitted_at: outcome.submitted_at,
            }))
        }
        Err(relay_err) => {
            let app_err = relay_err.into_app_error(&state.config.support_email);
            state
                .status_store
                .settle_failed(client_ref, app_err.client_message(), auto_reply_delivered)
                .await;
            Err(HttpAppError::from(app_err))
        }
    }
}

/// Report the submission status of a form instance. Unknown client refs
/// report idle: a freshly mounted form has no history.
#[utoipa::path(
    get,
    path = "/api/v0/leads/status/{client_ref}",
    tag = "leads",
    params(
        ("client_ref" = Uuid, Path, description = "Client-generated form instance id")
    ),
    responses(
        (status = 200, description = "Current submission status", body = SubmissionStatusResponse),
        (status = 400, description = "client_ref is not a UUID", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_submission_status(
    State(state): State<Arc<AppState>>,
    Path(client_ref): Path<Uuid>,
) -> Json<SubmissionStatusResponse> {
    match state.status_store.get(client_ref).await {
        Some(record) => Json(SubmissionStatusResponse::from(record)),
        None => Json(SubmissionStatusResponse::idle(client_ref)),
    }
}
