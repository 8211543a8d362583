//! Admin flag management.
//!
//! Uses the service key, which bypasses row-level security; the admin
//! column is not writable through any user-scoped path.

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;

use juniper_core::Email;
use juniper_storefront::config::PlatformConfig;
use juniper_storefront::platform::{PlatformError, ProfileChanges, ProfileStore};

/// Errors that can occur while granting the admin flag.
#[derive(Debug, Error)]
pub enum GrantError {
    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] juniper_core::EmailError),

    /// No profile row for the email.
    #[error("No account found for email: {0}")]
    NotFound(String),

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Set the admin flag on the profile row for `email`.
///
/// # Errors
///
/// Returns an error if the email is malformed, the account does not
/// exist, or the platform rejects the update.
pub async fn grant(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(GrantError::InvalidEmail)?;
    let config = PlatformConfig::from_env()?;
    let profiles = ProfileStore::new(&config);
    let service_key = config.service_key.expose_secret();

    let record = profiles
        .fetch_by_email(service_key, email.as_str())
        .await
        .map_err(GrantError::Platform)?
        .ok_or_else(|| GrantError::NotFound(email.as_str().to_owned()))?;

    if record.admin {
        info!(email = %email, "Account is already an admin");
        return Ok(());
    }

    let changes = ProfileChanges {
        admin: Some(true),
        ..Default::default()
    };
    profiles
        .update(service_key, record.id, &changes)
        .await
        .map_err(GrantError::Platform)?;

    info!(email = %email, user_id = %record.id, "Granted admin");
    Ok(())
}
