//! Platform catalog store client.
//!
//! Row access to the `products` table through the platform's `/rest/v1`
//! endpoint group. Listings are cached with `moka` (5-minute TTL);
//! mutations invalidate the cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use juniper_core::{CurrencyCode, Price, ProductId};

use crate::config::PlatformConfig;
use crate::models::Product;

use super::{PlatformError, check_status};

/// Cache TTL for product listings.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Maximum cached listing variants.
const CACHE_CAPACITY: u64 = 256;

/// A `products` row as stored by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// Price amount in the currency's standard unit.
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    CurrencyCode::USD.code().to_owned()
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        let currency_code = record.currency.parse().unwrap_or_else(|_| {
            warn!(
                product_id = %record.id,
                currency = %record.currency,
                "Unrecognized currency on product row, assuming USD"
            );
            CurrencyCode::USD
        });

        Self {
            id: record.id,
            name: record.name,
            price: Price::new(record.amount, currency_code),
            description: record.description,
            main_image_url: record.main_image_url,
            images: record.images,
            available_sizes: record.available_sizes,
            available_colors: record.available_colors,
            category: record.category,
            created_at: record.created_at,
        }
    }
}

/// Insert payload for a new product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInsert {
    pub name: String,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Partial update payload for a product row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_sizes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Listing parameters: newest first, optional category filter, optional
/// limit/offset pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProductQuery {
    fn cache_key(&self) -> String {
        format!(
            "category={}&limit={}&offset={}",
            self.category.as_deref().unwrap_or(""),
            self.limit.map_or_else(String::new, |l| l.to_string()),
            self.offset.map_or_else(String::new, |o| o.to_string()),
        )
    }
}

/// Client for the `products` table.
///
/// Listings are cached for 5 minutes; any mutation drops the whole cache
/// so admin edits show up on the next read.
#[derive(Clone)]
pub struct ProductStore {
    inner: Arc<ProductStoreInner>,
}

struct ProductStoreInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
    cache: Cache<String, Vec<ProductRecord>>,
}

impl ProductStore {
    /// Create a new product store client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ProductStoreInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_owned(),
                publishable_key: config.publishable_key.clone(),
                cache,
            }),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/products", self.inner.base_url)
    }

    /// List products, newest first.
    ///
    /// Public read: authenticated with the publishable key only.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<ProductRecord>, PlatformError> {
        let cache_key = query.cache_key();
        if let Some(records) = self.inner.cache.get(&cache_key).await {
            debug!(%cache_key, "Cache hit for product listing");
            return Ok(records);
        }

        let mut params = vec![
            ("select".to_owned(), "*".to_owned()),
            ("order".to_owned(), "created_at.desc".to_owned()),
        ];
        if let Some(category) = &query.category {
            params.push(("category".to_owned(), format!("eq.{category}")));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset".to_owned(), offset.to_string()));
        }

        let response = self
            .inner
            .client
            .get(self.table_url())
            .query(&params)
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(&self.inner.publishable_key)
            .send()
            .await?;

        let records: Vec<ProductRecord> = check_status(response).await?.json().await?;
        self.inner.cache.insert(cache_key, records.clone()).await;
        Ok(records)
    }

    /// Read a single product row.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform request fails.
    pub async fn fetch(&self, id: ProductId) -> Result<Option<ProductRecord>, PlatformError> {
        let response = self
            .inner
            .client
            .get(self.table_url())
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_owned())])
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(&self.inner.publishable_key)
            .send()
            .await?;

        let mut rows: Vec<ProductRecord> = check_status(response).await?.json().await?;
        Ok(rows.pop())
    }

    /// Insert a product row.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the insert (row-level
    /// security requires an admin bearer token).
    pub async fn create(
        &self,
        access_token: &str,
        insert: &ProductInsert,
    ) -> Result<ProductRecord, PlatformError> {
        let response = self
            .inner
            .client
            .post(self.table_url())
            .header("apikey", &self.inner.publishable_key)
            .header("Prefer", "return=representation")
            .bearer_auth(access_token)
            .json(insert)
            .send()
            .await?;

        let mut rows: Vec<ProductRecord> = check_status(response).await?.json().await?;
        let record = rows
            .pop()
            .ok_or_else(|| PlatformError::Parse("no product row returned on insert".to_owned()))?;

        self.inner.cache.invalidate_all();
        Ok(record)
    }

    /// Apply a partial update to a product row.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the update or the row does
    /// not exist.
    pub async fn update(
        &self,
        access_token: &str,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<ProductRecord, PlatformError> {
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

        let mut rows: Vec<ProductRecord> = check_status(response).await?.json().await?;
        let record = rows
            .pop()
            .ok_or_else(|| PlatformError::Parse(format!("no product row updated for {id}")))?;

        self.inner.cache.invalidate_all();
        Ok(record)
    }

    /// Delete a product row.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the delete.
    pub async fn delete(&self, access_token: &str, id: ProductId) -> Result<(), PlatformError> {
        let response = self
            .inner
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.inner.publishable_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        self.inner.cache.invalidate_all();
        Ok(())
    }
}
