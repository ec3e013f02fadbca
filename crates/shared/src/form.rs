//! Raw registration form input and its validation.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::{
    domain::{StudentId, StudentRecord},
    error::ValidationError,
};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Values exactly as read from the form inputs, before any trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub gender: String,
    pub courses: Vec<String>,
}

/// A registration that passed validation but has not been stamped yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub courses: Vec<String>,
}

impl RegistrationForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.courses.push(course.into());
        self
    }

    /// Checks name then email; the first failure wins.
    pub fn validate(&self) -> Result<NewStudent, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(NewStudent {
            name: name.to_string(),
            email: email.to_string(),
            age: non_empty(&self.age),
            gender: non_empty(&self.gender),
            courses: self.courses.clone(),
        })
    }
}

impl NewStudent {
    pub fn into_record(self, created_at: DateTime<Utc>) -> StudentRecord {
        StudentRecord {
            id: StudentId::new(),
            name: self.name,
            email: self.email,
            age: self.age,
            gender: self.gender,
            courses: self.courses,
            created_at,
        }
    }
}

/// Loose `local@domain.tld` shape check. Empty input is never valid.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
