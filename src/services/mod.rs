//! Business operations. Each call opens one [`UnitOfWork`](crate::database::UnitOfWork)
//! and commits it on success.

pub mod auth_service;
pub mod category_service;
pub mod document_service;
pub mod role_service;
pub mod tag_service;
pub mod user_service;

use thiserror::Error;

use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::auth::JwtError;
use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Password error: {0}")]
    Password(String),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

impl ServiceError {
    pub fn not_found(what: &str, id: i32) -> Self {
        ServiceError::NotFound(format!("{} {} not found", what, id))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Translate integrity violations on known constraints into caller-facing errors.
/// Anything unrecognised passes through unchanged.
pub(crate) fn map_constraint(
    err: DatabaseError,
    cases: &[(&str, fn() -> ServiceError)],
) -> ServiceError {
    if let Some(name) = err.constraint() {
        if let Some((_, build)) = cases.iter().find(|(constraint, _)| *constraint == name) {
            return build();
        }
    }
    ServiceError::Database(err)
}

/// Trimmed, non-empty text or a validation error on `field`
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, "Must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Lowercased, trimmed address with a local part and a dotted domain
pub(crate) fn normalize_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ServiceError::validation("email", "Must be a valid email address"));
    }
    Ok(email)
}

pub(crate) fn check_password_length(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::validation(
            "password",
            format!("Must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_constraints() {
        let err = DatabaseError::UniqueViolation {
            constraint: Some("tags_title_key".to_string()),
        };
        let mapped = map_constraint(err, &[("tags_title_key", || {
            ServiceError::Conflict("Tag already exists".to_string())
        })]);
        assert!(matches!(mapped, ServiceError::Conflict(msg) if msg == "Tag already exists"));
    }

    #[test]
    fn passes_through_unknown_constraints() {
        let err = DatabaseError::ForeignKeyViolation {
            constraint: Some("something_else".to_string()),
        };
        let mapped = map_constraint(err, &[("tags_title_key", || {
            ServiceError::Conflict("Tag already exists".to_string())
        })]);
        assert!(matches!(mapped, ServiceError::Database(DatabaseError::ForeignKeyViolation { .. })));
    }

    #[test]
    fn normalizes_valid_emails() {
        assert_eq!(normalize_email(" Clerk@Example.COM ").unwrap(), "clerk@example.com");
        for bad in ["", "clerk", "@example.com", "clerk@", "clerk@example", "a b@example.com", "a@b@c.com"] {
            assert!(normalize_email(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn enforces_minimum_password_length() {
        assert!(check_password_length("12345").is_err());
        assert!(check_password_length("123456").is_ok());
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Invoices ").unwrap(), "Invoices");
        assert!(matches!(
            required_text("title", "   "),
            Err(ServiceError::Validation { field, .. }) if field == "title"
        ));
    }
}
