//! Authentication extractors.
//!
//! Route handlers declare their auth requirement through an extractor:
//! [`BearerToken`] for "a token was presented", [`CurrentUser`] for "the
//! platform accepts the token", and [`RequireAdmin`] for "the token's
//! account has the admin flag on its profile record".
//!
//! The admin gate always consults the platform's profile record (the
//! hydrated source); token claims alone can never grant admin.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::{AuthUser, Profile, ProfileView};
use crate::platform::{AuthApi, PlatformError, ProfileApi};
use crate::services::session::merge_profile;
use crate::state::AppState;

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// No bearer token on the request.
    MissingToken,
    /// The platform rejected the token.
    InvalidToken,
    /// The token is valid but the account is not an admin.
    NotAdmin,
    /// The platform could not be consulted.
    Platform(PlatformError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            Self::Platform(err) => {
                tracing::error!(error = %err, "Auth check failed against platform");
                (StatusCode::BAD_GATEWAY, "External service error")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Extractor for the raw bearer token.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthRejection::MissingToken)?;

        if token.is_empty() {
            return Err(AuthRejection::MissingToken);
        }

        Ok(Self(token.to_owned()))
    }
}

/// Extractor that requires a platform-validated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser { user, .. }: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct CurrentUser {
    /// The validated account.
    pub user: AuthUser,
    /// The presented token, for forwarding to user-scoped platform calls.
    pub access_token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(access_token) = BearerToken::from_request_parts(parts, state).await?;

        let user = state
            .auth()
            .get_user(&access_token)
            .await
            .map_err(|err| match err {
                PlatformError::Api { .. } => AuthRejection::InvalidToken,
                other => AuthRejection::Platform(other),
            })?;

        Ok(Self { user, access_token })
    }
}

/// Extractor that requires an admin account.
///
/// Fetches the account's profile record and rejects unless its admin flag
/// is set. The resulting [`ProfileView`] is always hydrated.
pub struct RequireAdmin {
    /// The validated admin account.
    pub user: AuthUser,
    /// The presented token.
    pub access_token: String,
    /// The hydrated profile that granted access.
    pub profile: Profile,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser { user, access_token } =
            CurrentUser::from_request_parts(parts, state).await?;

        let record = state
            .profiles()
            .fetch(&access_token, user.id)
            .await
            .map_err(AuthRejection::Platform)?
            .ok_or(AuthRejection::NotAdmin)?;

        let view = ProfileView::Hydrated(merge_profile(&Profile::optimistic(&user), &record));
        if !view.is_admin() {
            return Err(AuthRejection::NotAdmin);
        }

        Ok(Self {
            user,
            access_token,
            profile: view.profile().clone(),
        })
    }
}
