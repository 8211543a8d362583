//! Image upload route.
//!
//! Accepts a multipart form with a `file` part and an optional `bucket`
//! part, writes the object under the caller's account prefix, and returns
//! the public URL.

use axum::{Json, Router, extract::Multipart, extract::State, routing::post};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::platform::storage::DEFAULT_BUCKET;
use crate::state::AppState;

/// Largest accepted upload (8 MiB), matching the platform's object limit.
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Build the upload router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

/// `POST /api/upload`
async fn upload(
    State(state): State<AppState>,
    CurrentUser { user, access_token }: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut bucket = DEFAULT_BUCKET.to_owned();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("malformed multipart body: {err}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("unreadable file part: {err}")))?;

                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(format!(
                        "file exceeds {MAX_UPLOAD_BYTES} bytes"
                    )));
                }

                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("bucket") => {
                bucket = field
                    .text()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("unreadable bucket part: {err}")))?;
            }
            _ => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_owned()))?;

    let path = crate::platform::StorageClient::object_path(user.id, &filename);
    let stored = state
        .storage()
        .upload(&access_token, &bucket, &path, bytes, &content_type)
        .await?;

    tracing::info!(user_id = %user.id, path = %stored.path, "Upload stored");
    Ok(Json(json!({ "url": stored.public_url, "path": stored.path })))
}
