use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which lead form produced a submission. Selects the constraint set and the
/// relay template pair used for dispatch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Contact,
    Pilot,
}

impl Display for SubmissionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionKind::Contact => write!(f, "general inquiry"),
            SubmissionKind::Pilot => write!(f, "pilot application"),
        }
    }
}

/// Contact form submission body.
///
/// `client_ref` identifies the mounted form instance on the page; the client
/// generates one per rendered form and reuses it across retries.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitContactRequest {
    pub client_ref: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

/// Pilot program application body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPilotRequest {
    pub client_ref: Uuid,
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub smb_count: Option<String>,
    /// Absent means the consent box was never checked.
    #[serde(default)]
    pub consent: bool,
}

/// Contact form values after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

/// Pilot application values after trimming and validation. Optional fields
/// that were submitted blank are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPilot {
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub smb_count: Option<String>,
    pub consent: bool,
}

/// A validated lead, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedLead {
    Contact(NormalizedContact),
    Pilot(NormalizedPilot),
}

impl NormalizedLead {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            NormalizedLead::Contact(_) => SubmissionKind::Contact,
            NormalizedLead::Pilot(_) => SubmissionKind::Pilot,
        }
    }

    pub fn submitter_name(&self) -> String {
        match self {
            NormalizedLead::Contact(contact) => {
                format!("{} {}", contact.first_name, contact.last_name)
            }
            NormalizedLead::Pilot(pilot) => pilot.name.clone(),
        }
    }

    pub fn submitter_email(&self) -> &str {
        match self {
            NormalizedLead::Contact(contact) => &contact.email,
            NormalizedLead::Pilot(pilot) => &pilot.email,
        }
    }
}
