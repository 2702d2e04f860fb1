//! Settings and message validation.

use super::model::ConnectionSettings;
use crate::message::EmailMessage;

/// Validation error for delivery inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Server host is empty.
    EmptyHost,
    /// Server port is invalid.
    InvalidPort,
    /// Username is empty.
    EmptyUsername,
    /// Password is empty.
    EmptyPassword,
    /// Sender address is empty.
    EmptyFrom,
    /// Sender address format is invalid.
    InvalidFrom,
    /// Recipient address is empty.
    EmptyRecipient,
    /// Recipient address format is invalid.
    InvalidRecipient,
    /// Reply-To address format is invalid.
    InvalidReplyTo,
    /// Subject line is empty.
    EmptySubject,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "Server host is required",
            Self::InvalidPort => "Server port must be 1-65535",
            Self::EmptyUsername => "Username is required",
            Self::EmptyPassword => "Password is required",
            Self::EmptyFrom => "Sender address is required",
            Self::InvalidFrom => "Invalid sender address format",
            Self::EmptyRecipient => "Recipient address is required",
            Self::InvalidRecipient => "Invalid recipient address format",
            Self::InvalidReplyTo => "Invalid Reply-To address format",
            Self::EmptySubject => "Subject is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::EmptyFrom | Self::InvalidFrom => "from",
            Self::EmptyRecipient | Self::InvalidRecipient => "to",
            Self::InvalidReplyTo => "reply_to",
            Self::EmptySubject => "subject",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating delivery inputs.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate connection settings.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_settings(settings: &ConnectionSettings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if settings.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    if settings.username.trim().is_empty() {
        errors.push(ValidationError::EmptyUsername);
    }

    if settings.password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate a single outgoing message.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_message(message: &EmailMessage) -> ValidationResult {
    let mut errors = Vec::new();

    if message.from.trim().is_empty() {
        errors.push(ValidationError::EmptyFrom);
    } else if !is_valid_email(&message.from) {
        errors.push(ValidationError::InvalidFrom);
    }

    if message.to.trim().is_empty() {
        errors.push(ValidationError::EmptyRecipient);
    } else if !is_valid_email(&message.to) {
        errors.push(ValidationError::InvalidRecipient);
    }

    if let Some(reply_to) = &message.reply_to {
        if !is_valid_email(reply_to) {
            errors.push(ValidationError::InvalidReplyTo);
        }
    }

    if message.subject.trim().is_empty() {
        errors.push(ValidationError::EmptySubject);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Basic email format check: `local@domain` with a dotted domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
