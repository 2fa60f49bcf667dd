use serde::Serialize;

use crate::models::NormalizedLead;

/// Template parameters for the acknowledgment email sent back to the
/// submitter. Built fresh per submission and never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AutoReplyPayload {
    pub to_name: String,
    pub to_email: String,
    /// Summary line for the acknowledgment template, e.g. "general inquiry".
    pub summary: String,
}

impl AutoReplyPayload {
    pub fn build(lead: &NormalizedLead) -> Self {
        Self {
            to_name: lead.submitter_name(),
            to_email: lead.submitter_email().to_string(),
            summary: lead.kind().to_string(),
        }
    }
}

/// Template parameters for the business notification email. Carries the full
/// normalized field values plus the dispatch-time timestamp rendered in the
/// business timezone.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationPayload {
    pub to_email: String,
    pub kind: String,
    pub from_name: String,
    pub from_email: String,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smb_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
}

impl NotificationPayload {
    /// `submitted_at` is captured at dispatch time, not form-open time.
    pub fn build(lead: &NormalizedLead, sales_inbox: &str, submitted_at: String) -> Self {
        let base = Self {
            to_email: sales_inbox.to_string(),
            kind: lead.kind().to_string(),
            from_name: lead.submitter_name(),
            from_email: lead.submitter_email().to_string(),
            submitted_at,
            message: None,
            title: None,
            company: None,
            phone: None,
            smb_count: None,
            consent: None,
        };

        match lead {
            NormalizedLead::Contact(contact) => Self {
                message: Some(contact.message.clone()),
                ..base
            },
            NormalizedLead::Pilot(pilot) => Self {
                title: Some(pilot.title.clone()),
                company: Some(pilot.company.clone()),
                phone: pilot.phone.clone(),
                smb_count: pilot.smb_count.clone(),
                consent: Some(if pilot.consent { "yes" } else { "no" }.to_string()),
                ..base
            },
        }
    }
}
