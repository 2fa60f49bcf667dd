//! Error types module
//!
//! All failures that cross the HTTP boundary are unified under `AppError`.
//! Each variant self-describes its HTTP rendering through `ErrorMetadata`.
//!
//! Auto-reply delivery failure is deliberately absent: it is tolerated,
//! logged, and recorded on the submission outcome instead of failing the
//! request.

use crate::validation::FieldErrors;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like relay slowness
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the client may retry)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("A submission for this form is already in flight")]
    SubmissionInFlight,

    #[error("Notification delivery failed: {}", detail.as_deref().unwrap_or("no detail from relay"))]
    NotificationDelivery {
        /// Error text returned by the relay, when it returned any.
        detail: Option<String>,
        support_email: String,
    },

    #[error("Relay did not respond within {seconds} seconds")]
    RelayTimeout { seconds: u64, support_email: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Error conversion implementations following Rust best practices
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::BadRequest(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation(_) => (
            422,
            "VALIDATION_FAILED",
            false,
            Some("Correct the highlighted fields and resubmit"),
            false,
            LogLevel::Debug,
        ),
        AppError::SubmissionInFlight => (
            409,
            "SUBMISSION_IN_FLIGHT",
            true,
            Some("Wait for the current submission to settle"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotificationDelivery { .. } => (
            502,
            "NOTIFICATION_DELIVERY_FAILED",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
        AppError::RelayTimeout { .. } => (
            504,
            "RELAY_TIMEOUT",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Field-error map for validation failures, used by the HTTP layer to
    /// attach the per-field messages to the response body.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Submission failed validation".to_string(),
            AppError::SubmissionInFlight => {
                "A submission is already in progress for this form. Please wait for it to finish."
                    .to_string()
            }
            AppError::NotificationDelivery {
                detail,
                support_email,
            } => match detail {
                Some(detail) => format!(
                    "Your submission could not be delivered: {}. Please try again or email {}.",
                    detail, support_email
                ),
                None => format!(
                    "Your submission could not be delivered. Please try again or email {}.",
                    support_email
                ),
            },
            AppError::RelayTimeout {
                seconds,
                support_email,
            } => format!(
                "The email service did not respond within {} seconds. Please try again or email {}.",
                seconds, support_email
            ),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_validation() {
        let mut fields = FieldErrors::new();
        fields.insert("email", "Email is required");
        let err = AppError::Validation(fields);
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Submission failed validation");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert!(err.field_errors().is_some());
    }

    #[test]
    fn test_error_metadata_submission_in_flight() {
        let err = AppError::SubmissionInFlight;
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "SUBMISSION_IN_FLIGHT");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_notification_delivery_propagates_relay_detail() {
        let err = AppError::NotificationDelivery {
            detail: Some("template error".to_string()),
            support_email: "support@lumiq.ai".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "NOTIFICATION_DELIVERY_FAILED");
        assert!(err.client_message().contains("template error"));
        assert!(err.client_message().contains("support@lumiq.ai"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_notification_delivery_without_detail_uses_generic_message() {
        let err = AppError::NotificationDelivery {
            detail: None,
            support_email: "support@lumiq.ai".to_string(),
        };
        let message = err.client_message();
        assert!(message.starts_with("Your submission could not be delivered."));
        assert!(message.contains("support@lumiq.ai"));
    }

    #[test]
    fn test_error_metadata_relay_timeout() {
        let err = AppError::RelayTimeout {
            seconds: 10,
            support_email: "support@lumiq.ai".to_string(),
        };
        assert_eq!(err.http_status_code(), 504);
        assert_eq!(err.error_code(), "RELAY_TIMEOUT");
        assert!(err.is_recoverable());
        assert!(err.client_message().contains("10 seconds"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err1 = AppError::SubmissionInFlight;
        assert_eq!(
            err1.suggested_action(),
            Some("Wait for the current submission to settle")
        );

        let err2 = AppError::NotFound("test".to_string());
        assert_eq!(err2.suggested_action(), Some("Verify the resource exists"));

        let err3 = AppError::Internal("test".to_string());
        assert_eq!(err3.suggested_action(), Some("Retry after a short delay"));
        assert!(err3.is_sensitive());
    }
}
