//! Form validation module
//!
//! Checks every field of a submission in a fixed order (required, then length
//! bounds, then format) and reports at most one message per field: the first
//! violated constraint. String values are trimmed before any check, and
//! validation never performs I/O.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::models::{
    NormalizedContact, NormalizedPilot, SubmitContactRequest, SubmitPilotRequest,
};

/// Maximum length for person and company name fields (50 characters)
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for the pilot applicant's job title (80 characters)
pub const MAX_TITLE_LENGTH: usize = 80;

/// Maximum length for the pilot applicant's company name (100 characters)
pub const MAX_COMPANY_LENGTH: usize = 100;

/// Maximum length for email addresses (255 characters)
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Length bounds for the contact message body
pub const MIN_MESSAGE_LENGTH: usize = 10;
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Length bounds for the optional pilot phone number
pub const MIN_PHONE_LENGTH: usize = 7;
pub const MAX_PHONE_LENGTH: usize = 20;

/// Maximum length for the optional served-SMB-count answer (40 characters)
pub const MAX_SMB_COUNT_LENGTH: usize = 40;

/// Digits plus common separators, with an optional leading plus.
const PHONE_PATTERN: &str = r"^\+?[0-9 ()\.\-]+$";

/// Per-field validation messages, at most one per field. Keys are the wire
/// field names the client submitted (camelCase).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = BTreeMap<String, String>)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records a message for a field. A field keeps its first message; later
    /// violations for the same field are ignored.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Outcome of validating one submission: either the normalized values or the
/// per-field message map, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult<T> {
    Valid(T),
    Invalid(FieldErrors),
}

impl<T> ValidationResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }
}

/// Validate a contact form submission, trimming every field first.
pub fn validate_contact(request: &SubmitContactRequest) -> ValidationResult<NormalizedContact> {
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    let email = request.email.trim();
    let message = request.message.trim();

    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "firstName", "First name", first_name, MAX_NAME_LENGTH);
    check_required_text(&mut errors, "lastName", "Last name", last_name, MAX_NAME_LENGTH);
    check_email(&mut errors, email);
    check_message(&mut errors, message);

    if !errors.is_empty() {
        return ValidationResult::Invalid(errors);
    }

    ValidationResult::Valid(NormalizedContact {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}

/// Validate a pilot application, trimming every field first. Optional fields
/// submitted blank are dropped rather than failing their bounds.
pub fn validate_pilot(request: &SubmitPilotRequest) -> ValidationResult<NormalizedPilot> {
    let name = request.name.trim();
    let title = request.title.trim();
    let company = request.company.trim();
    let email = request.email.trim();
    let phone = request
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let smb_count = request
        .smb_count
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "name", "Name", name, MAX_NAME_LENGTH);
    check_required_text(&mut errors, "title", "Title", title, MAX_TITLE_LENGTH);
    check_required_text(&mut errors, "company", "Company", company, MAX_COMPANY_LENGTH);
    check_email(&mut errors, email);
    if let Some(phone) = phone {
        check_phone(&mut errors, phone);
    }
    if let Some(smb_count) = smb_count {
        if smb_count.chars().count() > MAX_SMB_COUNT_LENGTH {
            errors.insert(
                "smbCount",
                format!("SMB count must be at most {} characters", MAX_SMB_COUNT_LENGTH),
            );
        }
    }
    if !request.consent {
        errors.insert(
            "consent",
            "You must agree to be contacted about the pilot program",
        );
    }

    if !errors.is_empty() {
        return ValidationResult::Invalid(errors);
    }

    ValidationResult::Valid(NormalizedPilot {
        name: name.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        smb_count: smb_count.map(str::to_string),
        consent: request.consent,
    })
}

/// Required text field: must be non-empty after trimming and within `max`
/// characters.
fn check_required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    max: usize,
) {
    if value.is_empty() {
        errors.insert(field, format!("{} is required", label));
    } else if value.chars().count() > max {
        errors.insert(field, format!("{} must be at most {} characters", label, max));
    }
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if value.is_empty() {
        errors.insert("email", "Email is required");
    } else if value.chars().count() > MAX_EMAIL_LENGTH {
        errors.insert(
            "email",
            format!("Email must be at most {} characters", MAX_EMAIL_LENGTH),
        );
    } else if !value.validate_email() {
        errors.insert("email", "Enter a valid email address");
    }
}

fn check_message(errors: &mut FieldErrors, value: &str) {
    if value.is_empty() {
        errors.insert("message", "Message is required");
    } else if value.chars().count() < MIN_MESSAGE_LENGTH {
        errors.insert(
            "message",
            format!("Message must be at least {} characters", MIN_MESSAGE_LENGTH),
        );
    } else if value.chars().count() > MAX_MESSAGE_LENGTH {
        errors.insert(
            "message",
            format!("Message must be at most {} characters", MAX_MESSAGE_LENGTH),
        );
    }
}

fn check_phone(errors: &mut FieldErrors, value: &str) {
    let length = value.chars().count();
    if !(MIN_PHONE_LENGTH..=MAX_PHONE_LENGTH).contains(&length) {
        errors.insert(
            "phone",
            format!(
                "Phone number must be between {} and {} characters",
                MIN_PHONE_LENGTH, MAX_PHONE_LENGTH
            ),
        );
    } else if !phone_shape_ok(value) {
        errors.insert("phone", "Enter a valid phone number");
    }
}

/// Allowed characters only, and at least seven digits. A pattern that fails
/// to compile rejects rather than accepts.
fn phone_shape_ok(value: &str) -> bool {
    let allowed = Regex::new(PHONE_PATTERN)
        .map(|pattern| pattern.is_match(value))
        .unwrap_or(false);
    allowed && value.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_LENGTH
}
