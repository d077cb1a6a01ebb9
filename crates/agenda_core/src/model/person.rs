//! Person domain model.
//!
//! # Responsibility
//! - Define the person record used as an activity link target.
//! - Validate profile fields before they reach persistence.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `email` and `nickname` are unique across people (enforced by storage).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier for a person.
pub type PersonId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Geographic point attached to a person profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Validation failures for person profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    InvalidEmail(String),
    BlankNickname,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email: `{value}`"),
            Self::BlankNickname => write!(f, "nickname must not be blank"),
        }
    }
}

impl Error for PersonValidationError {}

/// Persisted person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub email: String,
    pub nickname: String,
    pub is_admin: bool,
    pub location: Option<Location>,
}

/// Write model for creating a person; the store assigns the id.
///
/// New people are never admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub email: String,
    pub nickname: String,
    pub location: Option<Location>,
}

impl NewPerson {
    pub fn new(email: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            nickname: nickname.into(),
            location: None,
        }
    }

    /// Validates profile fields before persistence.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(PersonValidationError::InvalidEmail(self.email.clone()));
        }
        if self.nickname.trim().is_empty() {
            return Err(PersonValidationError::BlankNickname);
        }
        Ok(())
    }

    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            email: self.email,
            nickname: self.nickname,
            is_admin: false,
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewPerson, PersonValidationError};

    #[test]
    fn validate_accepts_plain_address() {
        assert!(NewPerson::new("ada@example.com", "ada").validate().is_ok());
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let err = NewPerson::new("not-an-email", "ada").validate().unwrap_err();
        assert_eq!(
            err,
            PersonValidationError::InvalidEmail("not-an-email".to_string())
        );
    }

    #[test]
    fn validate_rejects_blank_nickname() {
        let err = NewPerson::new("ada@example.com", " ").validate().unwrap_err();
        assert_eq!(err, PersonValidationError::BlankNickname);
    }
}
