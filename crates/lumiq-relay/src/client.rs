//! Transactional-email relay client.
//!
//! The relay exposes one logical operation: send a template with parameters.
//! `RelayTransport` is the seam the dispatcher talks to; the production
//! implementation posts to the provider's REST endpoint under a bounded
//! deadline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use lumiq_core::config::RelayConfig;
use lumiq_core::AppError;

/// Wire body for the provider's send endpoint.
#[derive(Debug, Clone, Serialize)]
struct SendEmailRequest {
    service_id: String,
    template_id: String,
    user_id: String,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    template_params: JsonValue,
}

/// Successful provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    pub status: u16,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay rejected the send with status {status}: {detail}")]
    Provider { status: u16, detail: String },

    #[error("failed to reach the relay: {0}")]
    Transport(String),

    #[error("relay send exceeded the {seconds}s deadline")]
    Timeout { seconds: u64 },
}

impl RelayError {
    /// Provider error text, when the relay returned anything worth showing
    /// to the submitter. Transport noise stays internal.
    pub fn detail(&self) -> Option<String> {
        match self {
            RelayError::Provider { detail, .. } if !detail.trim().is_empty() => {
                Some(detail.trim().to_string())
            }
            _ => None,
        }
    }

    /// Maps a failed required send to the submission-level error.
    pub fn into_app_error(self, support_email: &str) -> AppError {
        match self {
            RelayError::Timeout { seconds } => AppError::RelayTimeout {
                seconds,
                support_email: support_email.to_string(),
            },
            other => AppError::NotificationDelivery {
                detail: other.detail(),
                support_email: support_email.to_string(),
            },
        }
    }
}

/// Seam between the dispatcher and the provider.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send_template(
        &self,
        template_id: &str,
        params: JsonValue,
    ) -> Result<RelayReceipt, RelayError>;
}

/// Production transport posting to the provider's REST API.
pub struct HttpRelayTransport {
    config: RelayConfig,
    client: reqwest::Client,
}

impl HttpRelayTransport {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client for the relay")?;
        Ok(Self { config, client })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/api/v1.0/email/send",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send_template(
        &self,
        template_id: &str,
        params: JsonValue,
    ) -> Result<RelayReceipt, RelayError> {
        let body = SendEmailRequest {
            service_id: self.config.service_id.clone(),
            template_id: template_id.to_string(),
            user_id: self.config.public_key.clone(),
            access_token: self.config.private_key.clone(),
            template_params: params,
        };

        let response = self
            .client
            .post(self.send_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RelayError::Timeout {
                        seconds: self.config.timeout_seconds,
                    }
                } else {
                    RelayError::Transport(err.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        // Consider 2xx as success
        if (200..300).contains(&status) {
            Ok(RelayReceipt { status, text })
        } else {
            Err(RelayError::Provider {
                status,
                detail: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumiq_core::ErrorMetadata;

    fn relay_config(api_base: &str) -> RelayConfig {
        RelayConfig {
            api_base: api_base.to_string(),
            service_id: "service_lumiq".to_string(),
            public_key: "public_key".to_string(),
            private_key: None,
            contact_auto_reply_template: "tpl_contact_ack".to_string(),
            contact_notification_template: "tpl_contact_notify".to_string(),
            pilot_auto_reply_template: "tpl_pilot_ack".to_string(),
            pilot_notification_template: "tpl_pilot_notify".to_string(),
            timeout_seconds: 10,
        }
    }

    #[test]
    fn test_send_url_joins_base_without_double_slash() {
        let transport = HttpRelayTransport::new(relay_config("https://api.emailjs.com")).unwrap();
        assert_eq!(
            transport.send_url(),
            "https://api.emailjs.com/api/v1.0/email/send"
        );

        let transport = HttpRelayTransport::new(relay_config("https://api.emailjs.com/")).unwrap();
        assert_eq!(
            transport.send_url(),
            "https://api.emailjs.com/api/v1.0/email/send"
        );
    }

    #[test]
    fn test_detail_keeps_provider_text_only() {
        let err = RelayError::Provider {
            status: 422,
            detail: " template error ".to_string(),
        };
        assert_eq!(err.detail().as_deref(), Some("template error"));

        let err = RelayError::Provider {
            status: 500,
            detail: "   ".to_string(),
        };
        assert!(err.detail().is_none());

        let err = RelayError::Transport("dns failure".to_string());
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_provider_error_maps_to_notification_delivery() {
        let err = RelayError::Provider {
            status: 422,
            detail: "template error".to_string(),
        }
        .into_app_error("support@lumiq.ai");
        assert_eq!(err.error_code(), "NOTIFICATION_DELIVERY_FAILED");
        assert!(err.client_message().contains("template error"));
        assert!(err.client_message().contains("support@lumiq.ai"));
    }

    #[test]
    fn test_empty_detail_maps_to_generic_message() {
        let err = RelayError::Provider {
            status: 500,
            detail: String::new(),
        }
        .into_app_error("support@lumiq.ai");
        assert!(err
            .client_message()
            .starts_with("Your submission could not be delivered."));
    }

    #[test]
    fn test_timeout_maps_to_relay_timeout() {
        let err = RelayError::Timeout { seconds: 10 }.into_app_error("support@lumiq.ai");
        assert_eq!(err.error_code(), "RELAY_TIMEOUT");
        assert_eq!(err.http_status_code(), 504);
        assert!(err.client_message().contains("10 seconds"));
    }

    #[test]
    fn test_access_token_is_omitted_when_absent() {
        let body = SendEmailRequest {
            service_id: "service_lumiq".to_string(),
            template_id: "tpl_contact_ack".to_string(),
            user_id: "public_key".to_string(),
            access_token: None,
            template_params: serde_json::json!({"to_name": "John Doe"}),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("accessToken").is_none());
        assert_eq!(value["user_id"], "public_key");

        let body = SendEmailRequest {
            access_token: Some("secret".to_string()),
            ..body
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["accessToken"], "secret");
    }
}
