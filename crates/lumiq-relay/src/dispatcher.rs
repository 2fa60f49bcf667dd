//! Submission dispatcher.
//!
//! Every accepted submission produces two sends: a best-effort acknowledgment
//! to the submitter, then the required notification to the sales inbox. The
//! steps run strictly in sequence, and the overall outcome is decided by the
//! notification alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use lumiq_core::models::{
    AutoReplyPayload, NormalizedLead, NotificationPayload, SubmissionKind,
};
use lumiq_core::timefmt;
use lumiq_core::Config;

use crate::client::{RelayError, RelayReceipt, RelayTransport};

/// Result of one dispatch attempt. Both step results are kept so the
/// best-effort auto-reply policy stays observable.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub submitted_at: DateTime<Utc>,
    pub auto_reply: Result<RelayReceipt, RelayError>,
    pub notification: Result<RelayReceipt, RelayError>,
}

impl DispatchOutcome {
    pub fn auto_reply_delivered(&self) -> bool {
        self.auto_reply.is_ok()
    }

    /// Whether the submission as a whole succeeded.
    pub fn delivered(&self) -> bool {
        self.notification.is_ok()
    }
}

/// Sends the two emails for a validated lead through the relay.
#[derive(Clone)]
pub struct LeadDispatcher {
    transport: Arc<dyn RelayTransport>,
    contact_auto_reply_template: String,
    contact_notification_template: String,
    pilot_auto_reply_template: String,
    pilot_notification_template: String,
    sales_inbox: String,
    business_timezone: Tz,
}

impl LeadDispatcher {
    pub fn new(config: &Config, transport: Arc<dyn RelayTransport>) -> Self {
        Self {
            transport,
            contact_auto_reply_template: config.relay.contact_auto_reply_template.clone(),
            contact_notification_template: config.relay.contact_notification_template.clone(),
            pilot_auto_reply_template: config.relay.pilot_auto_reply_template.clone(),
            pilot_notification_template: config.relay.pilot_notification_template.clone(),
            sales_inbox: config.sales_inbox.clone(),
            business_timezone: config.business_timezone,
        }
    }

    fn auto_reply_template(&self, kind: SubmissionKind) -> &str {
        match kind {
            SubmissionKind::Contact => &self.contact_auto_reply_template,
            SubmissionKind::Pilot => &self.pilot_auto_reply_template,
        }
    }

    fn notification_template(&self, kind: SubmissionKind) -> &str {
        match kind {
            SubmissionKind::Contact => &self.contact_notification_template,
            SubmissionKind::Pilot => &self.pilot_notification_template,
        }
    }

    /// Runs the two-step send saga. The auto-reply is attempted first and
    /// never aborts the flow; the notification decides the outcome.
    #[tracing::instrument(skip(self, lead), fields(kind = %lead.kind()))]
    pub async fn dispatch(&self, lead: &NormalizedLead) -> DispatchOutcome {
        let kind = lead.kind();
        let submitted_at = Utc::now();

        let auto_reply = self
            .send(self.auto_reply_template(kind), &AutoReplyPayload::build(lead))
            .await;
        if let Err(err) = &auto_reply {
            tracing::warn!(
                error = %err,
                "Auto-reply delivery failed, continuing with notification"
            );
        }

        let notification_payload = NotificationPayload::build(
            lead,
            &self.sales_inbox,
            timefmt::human_timestamp(submitted_at, self.business_timezone),
        );
        let notification = self
            .send(self.notification_template(kind), &notification_payload)
            .await;
        match &notification {
            Ok(receipt) => {
                tracing::info!(status = receipt.status, "Lead notification delivered");
            }
            Err(err) => {
                tracing::error!(error = %err, "Lead notification delivery failed");
            }
        }

        DispatchOutcome {
            submitted_at,
            auto_reply,
            notification,
        }
    }

    async fn send<T: Serialize>(
        &self,
        template_id: &str,
        payload: &T,
    ) -> Result<RelayReceipt, RelayError> {
        let params = serde_json::to_value(payload).map_err(|err| {
            RelayError::Transport(format!("failed to encode template params: {}", err))
        })?;
        self.transport.send_template(template_id, params).await
    }
}
