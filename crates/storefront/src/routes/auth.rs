//! Auth routes.
//!
//! Thin pass-throughs to the platform's auth boundary. Action failures
//! (sign-in, sign-up, reset) surface as 4xx responses with inline-able
//! messages; session introspection maps platform rejection to 401.

use axum::{Json, Router, extract::State, routing::get, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::BearerToken;
use crate::platform::{AuthApi, ProfileApi};
use crate::services::session::AuthError;
use crate::state::AppState;

/// Build the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signout", post(sign_out))
        .route("/api/auth/session", get(session))
        .route("/api/auth/reset", post(reset_password))
        .route("/api/auth/oauth", post(oauth))
}

#[derive(Debug, Deserialize)]
struct SignInRequest {
    email: String,
    password: String,
}

/// `POST /api/auth/signin`
async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Value>> {
    let session = state
        .auth()
        .sign_in_with_password(&request.email, &request.password)
        .await
        .map_err(AuthError::from_sign_in)?;

    tracing::info!(email = %session.user.email, "Sign-in");
    Ok(Json(json!({ "user": session.user, "session": session })))
}

#[derive(Debug, Deserialize)]
struct SignUpRequest {
    email: String,
    password: String,
    name: Option<String>,
}

/// `POST /api/auth/signup`
///
/// When the platform auto-confirms and returns a session, a profile row
/// is ensured to exist; a failure there is logged but does not fail the
/// registration.
async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<Value>> {
    let outcome = state
        .auth()
        .sign_up(&request.email, &request.password, request.name.as_deref())
        .await
        .map_err(AuthError::from_sign_up)?;

    if let Some(session) = &outcome.session {
        let insert = crate::platform::ProfileInsert {
            id: outcome.user.id,
            email: outcome.user.email.as_str().to_owned(),
            name: request.name.clone(),
        };
        if let Err(err) = state
            .profiles()
            .upsert(&session.access_token, &insert)
            .await
        {
            tracing::warn!(error = %err, "Profile creation after sign-up failed");
        }
    }

    tracing::info!(email = %outcome.user.email, "Sign-up");
    Ok(Json(json!({ "user": outcome.user, "session": outcome.session })))
}

/// `POST /api/auth/signout`
async fn sign_out(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
) -> Result<Json<Value>> {
    state.auth().sign_out(&access_token).await?;
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/auth/session`
///
/// Confirms the platform still accepts the presented token and returns
/// the owning account.
async fn session(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
) -> Result<Json<Value>> {
    let user = state.auth().get_user(&access_token).await?;
    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    email: String,
}

/// `POST /api/auth/reset`
async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<Value>> {
    let redirect_to = format!("{}/reset-password", state.config().base_url);
    state
        .auth()
        .reset_password_for_email(&request.email, &redirect_to)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct OAuthRequest {
    provider: String,
    redirect_to: Option<String>,
}

/// `POST /api/auth/oauth`
///
/// Returns the provider redirect URL; the platform handles state and the
/// provider round-trip.
async fn oauth(
    State(state): State<AppState>,
    Json(request): Json<OAuthRequest>,
) -> Result<Json<Value>> {
    let redirect_to = request
        .redirect_to
        .unwrap_or_else(|| format!("{}/auth/callback", state.config().base_url));
    let url = state.auth().authorize_url(&request.provider, &redirect_to);

    Ok(Json(json!({ "url": url })))
}
