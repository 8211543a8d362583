//! Profile self-service routes.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::platform::{ProfileApi, ProfileChanges, ProfileInsert};
use crate::state::AppState;

/// Build the profile router.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/user/profile",
        get(get_profile).put(update_profile),
    )
}

/// `GET /api/user/profile`
///
/// Returns the caller's profile record, creating it from token claims if
/// the row does not exist yet (accounts provisioned before the profile
/// trigger existed).
async fn get_profile(
    State(state): State<AppState>,
    CurrentUser { user, access_token }: CurrentUser,
) -> Result<Json<Value>> {
    let record = match state.profiles().fetch(&access_token, user.id).await? {
        Some(record) => record,
        None => {
            tracing::info!(user_id = %user.id, "Profile row missing, creating");
            let insert = ProfileInsert {
                id: user.id,
                email: user.email.as_str().to_owned(),
                name: user
                    .user_metadata
                    .full_name
                    .clone()
                    .or_else(|| user.user_metadata.name.clone()),
            };
            state.profiles().upsert(&access_token, &insert).await?
        }
    };

    Ok(Json(json!({ "profile": record })))
}

/// `PUT /api/user/profile`
///
/// The admin flag is not settable on this path; it is stripped before the
/// update regardless of what the caller sent.
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser { user, access_token }: CurrentUser,
    Json(mut changes): Json<ProfileChanges>,
) -> Result<Json<Value>> {
    changes.admin = None;

    let record = state
        .profiles()
        .update(&access_token, user.id, &changes)
        .await?;

    Ok(Json(json!({ "profile": record })))
}
