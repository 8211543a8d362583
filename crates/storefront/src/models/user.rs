//! User identity and profile types.
//!
//! A signed-in user has two profile provenances: an *optimistic* profile
//! derived entirely from token claims (available with zero round-trips)
//! and a *hydrated* profile merged with the platform's profile record.
//! Only the hydrated profile is authoritative for the admin flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use juniper_core::{Email, UserId};

/// Identity attributes carried in the auth token's claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// The platform's view of an authenticated account.
///
/// Returned by the auth boundary's user endpoint and embedded in sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account ID.
    pub id: UserId,
    /// Account email address.
    pub email: Email,
    /// When the email was confirmed, if it has been.
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Free-form claims attached at sign-up or by the OAuth provider.
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// A user profile as consumed by the UI and the admin gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Same as the owning account's ID.
    pub id: UserId,
    /// Account email.
    pub email: Email,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Whether the user may manage the catalog.
    pub admin: bool,
    /// Whether the account email has been confirmed.
    pub email_verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Build the optimistic profile from token claims alone.
    ///
    /// The display name falls back through the metadata's `full_name` and
    /// `name` to the email local part. `admin` is always `false` here; an
    /// optimistic profile must never grant privileged access.
    #[must_use]
    pub fn optimistic(user: &AuthUser) -> Self {
        let name = user
            .user_metadata
            .full_name
            .clone()
            .or_else(|| user.user_metadata.name.clone())
            .or_else(|| Some(user.email.local_part().to_owned()));

        Self {
            id: user.id,
            email: user.email.clone(),
            name,
            avatar_url: user.user_metadata.avatar_url.clone(),
            admin: false,
            email_verified: user.email_confirmed_at.is_some(),
            created_at: user.created_at,
        }
    }
}

/// A profile tagged with its provenance.
///
/// Consumers make gating decisions on the variant, not on field presence:
/// admin-only affordances require [`ProfileView::Hydrated`] with
/// `admin == true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "profile", rename_all = "snake_case")]
pub enum ProfileView {
    /// Derived from token claims only; `admin` is always `false`.
    Optimistic(Profile),
    /// Merged with the platform's profile record; authoritative.
    Hydrated(Profile),
}

impl ProfileView {
    /// The profile data regardless of provenance.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        match self {
            Self::Optimistic(p) | Self::Hydrated(p) => p,
        }
    }

    /// Whether this view has been confirmed against the platform record.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        matches!(self, Self::Hydrated(_))
    }

    /// Whether this view grants admin access.
    ///
    /// `true` only for a hydrated profile whose record carries the admin
    /// flag. An optimistic profile never does, by construction, but the
    /// provenance check here makes the gate independent of that.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        match self {
            Self::Hydrated(p) => p.admin,
            Self::Optimistic(_) => false,
        }
    }
}
