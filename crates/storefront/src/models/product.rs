//! Catalog product domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use juniper_core::{Price, ProductId};

/// A catalog item.
///
/// Read-only to the filter engine: fetched per page load and immutable for
/// the duration of a filtering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    pub images: Vec<String>,
    pub available_sizes: Vec<String>,
    pub available_colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is offered in `size`.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.available_sizes.iter().any(|s| s == size)
    }

    /// Whether the product is offered in `color`.
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.available_colors.iter().any(|c| c == color)
    }
}
