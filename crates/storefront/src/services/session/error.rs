//! Authentication error types.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors surfaced to callers of the explicit auth actions
/// (sign-in, sign-up, password reset).
///
/// Background synchronization failures never produce these; they are
/// logged and swallowed so a degraded profile service cannot sign a user
/// out.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] juniper_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    AccountExists,

    /// The platform rejected the password.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Platform/network error.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl AuthError {
    /// Map a platform rejection of a password grant.
    pub(crate) fn from_sign_in(err: PlatformError) -> Self {
        match err {
            PlatformError::Api {
                status: 400 | 401, ..
            } => Self::InvalidCredentials,
            other => Self::Platform(other),
        }
    }

    /// Map a platform rejection of a sign-up.
    pub(crate) fn from_sign_up(err: PlatformError) -> Self {
        match err {
            PlatformError::Api {
                status: 422,
                message,
            } => {
                if message.to_lowercase().contains("registered")
                    || message.to_lowercase().contains("exists")
                {
                    Self::AccountExists
                } else {
                    Self::WeakPassword(message)
                }
            }
            other => Self::Platform(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_maps_rejections_to_invalid_credentials() {
        let err = AuthError::from_sign_in(PlatformError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        });
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = AuthError::from_sign_in(PlatformError::Api {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(matches!(err, AuthError::Platform(_)));
    }

    #[test]
    fn test_sign_up_distinguishes_taken_email_from_weak_password() {
        let err = AuthError::from_sign_up(PlatformError::Api {
            status: 422,
            message: "User already registered".into(),
        });
        assert!(matches!(err, AuthError::AccountExists));

        let err = AuthError::from_sign_up(PlatformError::Api {
            status: 422,
            message: "Password should be at least 6 characters".into(),
        });
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }
}
