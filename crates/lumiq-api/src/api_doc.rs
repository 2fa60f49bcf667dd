//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`; all paths are served
//! under `/api/v0`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use lumiq_core::models;
use lumiq_core::validation;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lumiq Leads API",
        version = "0.1.0",
        description = "Lead submission backend for the Lumiq marketing site. Validates contact and pilot form submissions and relays each accepted lead as two emails: an acknowledgment to the submitter and a notification to the sales inbox. All endpoints are versioned under /api/v0/.",
        contact(
            name = "API Support",
            url = "https://github.com/lumiq-ai/lumiq-leads"
        )
    ),
    paths(
        handlers::leads::submit_contact,
        handlers::leads::submit_pilot,
        handlers::leads::get_submission_status,
    ),
    components(
        schemas(
            models::SubmitContactRequest,
            models::SubmitPilotRequest,
            models::SubmissionKind,
            models::SubmissionStatus,
            models::SubmissionResponse,
            models::SubmissionStatusResponse,
            validation::FieldErrors,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "leads", description = "Lead form submission and status polling")
    )
)]
pub struct ApiDoc;
