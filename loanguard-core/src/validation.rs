//! Input checks run before any credential or directory work
//!
//! ```rust
//! use loanguard_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("borrower@example.com").is_ok());
//! assert!(validate_email("borrower").is_err());
//! assert!(validate_password("correcthorse9").is_ok());
//! assert!(validate_password("horse").is_err());
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;
pub const MAX_NAME_CHARS: usize = 100;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

type PasswordRule = (fn(&str) -> bool, &'static str);

const PASSWORD_RULES: &[PasswordRule] = &[
    (
        |p| !p.trim().is_empty(),
        "Password cannot be only whitespace",
    ),
    (
        |p| p.chars().count() >= MIN_PASSWORD_CHARS,
        "Password must be at least 8 characters long",
    ),
    (
        |p| p.chars().count() <= MAX_PASSWORD_CHARS,
        "Password must be no more than 128 characters long",
    ),
    (
        |p| p.chars().any(char::is_alphabetic),
        "Password must contain a letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_digit()),
        "Password must contain a digit",
    ),
];

/// Check an email address against a practical subset of RFC 5322
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    match email {
        "" => Err(ValidationError::MissingField("Email is required".into())),
        e if e.len() > MAX_EMAIL_LEN => {
            Err(ValidationError::InvalidEmail("Email is too long".into()))
        }
        e if EMAIL_REGEX.is_match(e) => Ok(()),
        _ => Err(ValidationError::InvalidEmail("Invalid email format".into())),
    }
}

/// Enforce the password strength policy
///
/// The first rule that fails is reported.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password is required".into()));
    }

    match PASSWORD_RULES.iter().find(|(holds, _)| !holds(password)) {
        Some((_, message)) => Err(ValidationError::InvalidPassword((*message).to_string())),
        None => Ok(()),
    }
}

pub fn validate_name(name: Option<&str>) -> Result<(), ValidationError> {
    let Some(name) = name else {
        return Ok(());
    };

    if name.trim().is_empty() {
        Err(ValidationError::InvalidField(
            "Name cannot be blank".into(),
        ))
    } else if name.chars().count() > MAX_NAME_CHARS {
        Err(ValidationError::InvalidField(
            "Name must be no more than 100 characters long".into(),
        ))
    } else {
        Ok(())
    }
}
