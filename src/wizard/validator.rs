//! Contact-step validation.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ContactField, ContactInputs};

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_FORMAT_MESSAGE: &str = "The email address is not formatted correctly";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Field-level messages from the last validation run; empty when valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<ContactField, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: ContactField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Checks one field: required after trimming, and email-shaped for the email field.
pub fn validate_field(field: ContactField, raw: &str) -> Result<(), &'static str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    if field == ContactField::Email && !is_valid_email(value) {
        return Err(EMAIL_FORMAT_MESSAGE);
    }
    Ok(())
}

/// Validates every contact field, collecting one message per invalid field.
pub fn validate_contact(inputs: &ContactInputs) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in ContactField::ALL {
        if let Err(message) = validate_field(field, inputs.get(field)) {
            errors.insert(field, message);
        }
    }
    errors
}
