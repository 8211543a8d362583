//! Session types and durable vault keys.
//!
//! The platform reports token expiry in epoch **seconds**; the durable
//! token bundle stores epoch **milliseconds** so expiry checks compare
//! directly against the vault clock.

use serde::{Deserialize, Serialize};

use super::user::AuthUser;

/// A session as issued by the platform's auth boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSession {
    /// Bearer token for user-scoped requests.
    pub access_token: String,
    /// Token used to obtain a replacement session.
    pub refresh_token: String,
    /// Seconds of validity at issue time.
    #[serde(default)]
    pub expires_in: i64,
    /// Expiry as epoch seconds.
    pub expires_at: i64,
    /// The owning account.
    pub user: AuthUser,
}

/// The durable token bundle persisted under [`vault_keys::ACCESS_TOKEN`].
///
/// Survives restarts so a new process can rehydrate the session without
/// re-authenticating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch milliseconds.
    #[serde(rename = "expires_at")]
    pub expires_at_ms: i64,
}

impl TokenBundle {
    /// Capture the durable parts of a platform session.
    #[must_use]
    pub fn from_session(session: &PlatformSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at_ms: session.expires_at * 1000,
        }
    }

    /// Whether the bundle has expired as of `now_ms`.
    #[must_use]
    pub const fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }

    /// Seconds of validity remaining as of `now_ms` (clamped at zero).
    #[must_use]
    pub const fn remaining_seconds(&self, now_ms: i64) -> i64 {
        let remaining = (self.expires_at_ms - now_ms) / 1000;
        if remaining < 0 { 0 } else { remaining }
    }
}

/// Durable vault keys owned by the session synchronizer.
///
/// Nothing outside the vault reads or writes these strings directly.
pub mod vault_keys {
    use juniper_core::UserId;

    /// Key for the serialized [`super::TokenBundle`].
    pub const ACCESS_TOKEN: &str = "juniper_access_token";

    /// Prefix for per-user last-sync timestamps (epoch ms as a string).
    pub const AUTH_SYNC_PREFIX: &str = "juniper_auth_sync_";

    /// Prefix for per-user profile fetch timestamps.
    pub const PROFILE_FETCH_PREFIX: &str = "juniper_profile_fetch_";

    /// Last-sync key for a user.
    #[must_use]
    pub fn auth_sync(user_id: UserId) -> String {
        format!("{AUTH_SYNC_PREFIX}{user_id}")
    }

    /// Profile-fetch key for a user.
    #[must_use]
    pub fn profile_fetch(user_id: UserId) -> String {
        format!("{PROFILE_FETCH_PREFIX}{user_id}")
    }
}
