//! Platform object storage client.
//!
//! Upload-and-serve for product imagery through the platform's
//! `/storage/v1` endpoint group. Objects are written under
//! `{user_id}/{unique}.{ext}` and served from the bucket's public URL
//! space.

use std::sync::Arc;

use serde::Serialize;

use juniper_core::{ObjectPath, UserId};

use crate::config::PlatformConfig;

use super::{PlatformError, check_status};

/// Default bucket for product imagery.
pub const DEFAULT_BUCKET: &str = "product-images";

/// A stored object and where it is served from.
#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub path: ObjectPath,
    pub public_url: String,
}

/// Client for the platform's object storage endpoint group.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl StorageClient {
    /// Create a new storage client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_owned(),
                publishable_key: config.publishable_key.clone(),
            }),
        }
    }

    /// Build the object path for an upload: `{user_id}/{unique}.{ext}`.
    ///
    /// The unique segment is a fresh UUID, so concurrent uploads of the
    /// same filename never collide.
    #[must_use]
    pub fn object_path(user_id: UserId, original_filename: &str) -> ObjectPath {
        let ext = original_filename
            .rsplit_once('.')
            .map_or("bin", |(_, ext)| ext);
        ObjectPath::new(format!("{user_id}/{}.{ext}", uuid::Uuid::new_v4()))
    }

    /// The public URL an object in `bucket` is served from.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &ObjectPath) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.inner.base_url
        )
    }

    /// Upload an object and return its path and public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the upload.
    pub async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &ObjectPath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, PlatformError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(&url)
            .header("apikey", &self.inner.publishable_key)
            .header("Content-Type", content_type)
            .bearer_auth(access_token)
            .body(bytes)
            .send()
            .await?;

        check_status(response).await?;

        Ok(StoredObject {
            path: path.clone(),
            public_url: self.public_url(bucket, path),
        })
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_object_path_keeps_extension_and_user_prefix() {
        let user_id = UserId::random();
        let path = StorageClient::object_path(user_id, "photo.front.jpeg");
        let path = path.as_str();
        assert!(path.starts_with(&format!("{user_id}/")));
        assert!(path.ends_with(".jpeg"));
    }

    #[test]
    fn test_object_path_falls_back_without_extension() {
        let path = StorageClient::object_path(UserId::random(), "photo");
        assert!(path.as_str().ends_with(".bin"));
    }

    #[test]
    fn test_public_url_shape() {
        let client = StorageClient::new(&PlatformConfig {
            url: "https://project.platform.test".into(),
            publishable_key: "pk_test".into(),
            service_key: SecretString::from("sk_test"),
        });
        let url = client.public_url(DEFAULT_BUCKET, &ObjectPath::new("abc/def.png"));
        assert_eq!(
            url,
            "https://project.platform.test/storage/v1/object/public/product-images/abc/def.png"
        );
    }
}
