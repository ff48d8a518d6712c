//! Authentication primitives: login credentials and outcomes.
//!
//! Credential checks are owned by the database; these types only shape and
//! validate the inputs before a service talks to a repository.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Error, Performer, PerformerId};

/// Reasons a login payload is rejected before reaching the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// The performer id was zero or negative.
    #[error("performer id must be positive")]
    NonPositiveId,
    /// The password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace and is wiped from memory on
/// drop. It is forwarded verbatim to the authentication stored procedure,
/// which owns the comparison.
///
/// # Examples
/// ```
/// use fgw_admin::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(1042, "secret").expect("valid");
/// assert_eq!(creds.performer_id().get(), 1042);
/// assert!(LoginCredentials::try_from_parts(0, "secret").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    performer_id: PerformerId,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw login inputs.
    ///
    /// # Errors
    /// Rejects non-positive ids and empty passwords.
    pub fn try_from_parts(performer_id: i32, password: &str) -> Result<Self, LoginValidationError> {
        let performer_id = PerformerId::new(performer_id);
        if !performer_id.is_valid() {
            return Err(LoginValidationError::NonPositiveId);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            performer_id,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Performer attempting to log in.
    #[must_use]
    pub const fn performer_id(&self) -> PerformerId {
        self.performer_id
    }

    /// Password as supplied.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("performer_id", &self.performer_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of an authentication attempt as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthOutcome {
    /// Whether the performer is now authenticated.
    pub success: bool,
    /// The authenticated performer on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<Performer>,
    /// Human-readable summary.
    pub message: String,
}

impl AuthOutcome {
    /// Successful outcome for `performer`.
    #[must_use]
    pub fn succeeded(performer: Performer) -> Self {
        Self {
            success: true,
            performer: Some(performer),
            message: "authentication successful".to_owned(),
        }
    }

    /// Failed outcome with `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            performer: None,
            message: message.into(),
        }
    }
}

/// A failed authentication: the client-facing outcome plus the error that
/// caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthFailure {
    /// Outcome with `success == false`.
    pub outcome: AuthOutcome,
    /// Underlying cause.
    pub error: Error,
}

impl AuthFailure {
    /// Pair `error` with a failed outcome carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>, error: Error) -> Self {
        Self {
            outcome: AuthOutcome::failed(message),
            error,
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.outcome.message, self.error)
    }
}

impl std::error::Error for AuthFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
