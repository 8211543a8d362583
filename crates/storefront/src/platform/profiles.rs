//! Platform profile store client.
//!
//! Row access to the `user_profiles` table through the platform's
//! `/rest/v1` endpoint group. Row-level security scopes reads and writes
//! to the bearer token's account; the service key bypasses it for
//! maintenance (admin grants).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use juniper_core::UserId;

use crate::config::PlatformConfig;

use super::{PlatformError, check_status};

/// A `user_profiles` row as stored by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInsert {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Partial update payload for a profile row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

/// Operations the session synchronizer needs from the profile boundary.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Read a profile row by account ID.
    async fn fetch(
        &self,
        access_token: &str,
        id: UserId,
    ) -> Result<Option<ProfileRecord>, PlatformError>;

    /// Insert a profile row, merging on conflict.
    async fn upsert(
        &self,
        access_token: &str,
        insert: &ProfileInsert,
    ) -> Result<ProfileRecord, PlatformError>;
}

#[async_trait]
impl<T> ProfileApi for std::sync::Arc<T>
where
    T: ProfileApi + ?Sized,
{
    async fn fetch(
        &self,
        access_token: &str,
        id: UserId,
    ) -> Result<Option<ProfileRecord>, PlatformError> {
        (**self).fetch(access_token, id).await
    }

    async fn upsert(
        &self,
        access_token: &str,
        insert: &ProfileInsert,
    ) -> Result<ProfileRecord, PlatformError> {
        (**self).upsert(access_token, insert).await
    }
}

/// Client for the `user_profiles` table.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<ProfileStoreInner>,
}

struct ProfileStoreInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl ProfileStore {
    /// Create a new profile store client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(ProfileStoreInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_owned(),
                publishable_key: config.publishable_key.clone(),
            }),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/user_profiles", self.inner.base_url)
    }

    /// Read a profile row by email.
    ///
    /// Only useful with the service key; row-level security hides foreign
    /// rows from user tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    pub async fn fetch_by_email(
        &self,
        access_token: &str,
        email: &str,
    ) -> Result<Option<ProfileRecord>, PlatformError> {
        let response = self
            .inner
            .client
            .get(self.table_url())
            .query(&[("email", format!("eq.{email}")), ("select", "*".to_owned())])
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let mut rows: Vec<ProfileRecord> = check_status(response).await?.json().await?;
        Ok(rows.pop())
    }

    /// Apply a partial update to a profile row.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the update or the row does
    /// not exist (row-level security makes a foreign row look absent).
    pub async fn update(
        &self,
        access_token: &str,
        id: UserId,
        changes: &ProfileChanges,
    ) -> Result<ProfileRecord, PlatformError> {
        let response = self
            .inner
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.inner.publishable_key)
            .header("Prefer", "return=representation")
            .bearer_auth(access_token)
            .json(changes)
            .send()
            .await?;

        let mut rows: Vec<ProfileRecord> = check_status(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| PlatformError::Parse(format!("no profile row updated for {id}")))
    }
}

#[async_trait]
impl ProfileApi for ProfileStore {
    async fn fetch(
        &self,
        access_token: &str,
        id: UserId,
    ) -> Result<Option<ProfileRecord>, PlatformError> {
        let response = self
            .inner
            .client
            .get(self.table_url())
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_owned())])
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let mut rows: Vec<ProfileRecord> = check_status(response).await?.json().await?;
        Ok(rows.pop())
    }

    async fn upsert(
        &self,
        access_token: &str,
        insert: &ProfileInsert,
    ) -> Result<ProfileRecord, PlatformError> {
        let response = self
            .inner
            .client
            .post(self.table_url())
            .header("apikey", &self.inner.publishable_key)
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .bearer_auth(access_token)
            .json(insert)
            .send()
            .await?;

        let mut rows: Vec<ProfileRecord> = check_status(response).await?.json().await?;
        rows.pop().ok_or_else(|| {
            PlatformError::Parse(format!("no profile row returned for {}", insert.id))
        })
    }
}
