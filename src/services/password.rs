// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential checks run before anything goes over the wire.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::models::{LoginCredentials, RegisterData};

/// Characters that satisfy the "special character" rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Score one point each for length >= 8, length >= 12, lowercase,
    /// uppercase, digit and any non-alphanumeric character.
    pub fn of(password: &str) -> Self {
        if password.is_empty() {
            return PasswordStrength::Weak;
        }

        let len = password.chars().count();
        let checks = [
            len >= 8,
            len >= 12,
            password.chars().any(|c| c.is_ascii_lowercase()),
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        let score = checks.iter().filter(|&&passed| passed).count();

        match score {
            0..=3 => PasswordStrength::Weak,
            4..=5 => PasswordStrength::Medium,
            _ => PasswordStrength::Strong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak password",
            PasswordStrength::Medium => "Good password",
            PasswordStrength::Strong => "Strong password",
        }
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// `local@domain.tld` with an alphabetic TLD of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Whether a well-formed address belongs to one of `allowed` (case-insensitive).
///
/// Malformed addresses pass; reporting those is [`validate_email`]'s job.
pub fn is_allowed_domain(email: &str, allowed: &[&str]) -> bool {
    if !EMAIL_RE.is_match(email) {
        return true;
    }
    let domain = email
        .split_once('@')
        .map(|(_, d)| d.to_lowercase())
        .unwrap_or_default();
    allowed.iter().any(|a| a.eq_ignore_ascii_case(&domain))
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email")
            .with_message(Cow::Borrowed("Please enter a valid email address")))
    }
}

/// Minimum length plus upper, lower, digit and special character.
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_length").with_message(Cow::Borrowed(
            "Password must be at least 8 characters long",
        )));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_pattern").with_message(Cow::Borrowed(
            "Password must contain uppercase, lowercase, number and special character",
        )))
    }
}

/// Login input. Only presence is checked for the password.
#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl From<LoginForm> for LoginCredentials {
    fn from(form: LoginForm) -> Self {
        LoginCredentials {
            email: form.email.trim().to_string(),
            password: form.password,
        }
    }
}

/// Registration input including the confirmation field, which never leaves
/// the client.
#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(custom(function = "validate_password_policy"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    pub tech_interests: Vec<String>,
}

impl From<RegisterForm> for RegisterData {
    fn from(form: RegisterForm) -> Self {
        RegisterData {
            email: form.email.trim().to_string(),
            password: form.password,
            name: form.name.trim().to_string(),
            tech_interests: form.tech_interests,
        }
    }
}
