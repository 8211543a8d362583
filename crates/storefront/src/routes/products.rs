//! Catalog routes.
//!
//! Listing is public and ships the filter bootstrap data (price bounds,
//! distinct sizes/colors) the sidebar needs; mutations require the admin
//! flag on the caller's profile record.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use juniper_core::{PriceRange, ProductId};

use crate::catalog::{distinct_colors, distinct_sizes, price_bounds, vocab};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::platform::{ProductChanges, ProductInsert, ProductQuery};
use crate::state::AppState;

/// Build the catalog router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/catalog/options", get(catalog_options))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Sidebar bootstrap data derived from the listed products.
#[derive(Debug, Serialize)]
struct FilterBootstrap {
    price_bounds: Option<PriceRange>,
    available_sizes: Vec<String>,
    available_colors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    products: Vec<Product>,
    filters: FilterBootstrap,
}

/// `GET /api/products`
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let query = ProductQuery {
        category: params.category,
        limit: params.limit,
        offset: params.offset,
    };

    let products: Vec<Product> = state
        .products()
        .list(&query)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let filters = FilterBootstrap {
        price_bounds: price_bounds(&products),
        available_sizes: distinct_sizes(&products),
        available_colors: distinct_colors(&products),
    };

    Ok(Json(ListResponse { products, filters }))
}

/// `GET /api/products/{id}`
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let record = state
        .products()
        .fetch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(json!({ "product": Product::from(record) })))
}

/// `POST /api/products` (admin)
async fn create_product(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(insert): Json<ProductInsert>,
) -> Result<Json<Value>> {
    let record = state
        .products()
        .create(&admin.access_token, &insert)
        .await?;

    tracing::info!(product_id = %record.id, admin = %admin.user.email, "Product created");
    Ok(Json(json!({ "product": Product::from(record) })))
}

/// `PUT /api/products/{id}` (admin)
async fn update_product(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Json(changes): Json<ProductChanges>,
) -> Result<Json<Value>> {
    let record = state
        .products()
        .update(&admin.access_token, id, &changes)
        .await?;

    tracing::info!(product_id = %id, admin = %admin.user.email, "Product updated");
    Ok(Json(json!({ "product": Product::from(record) })))
}

/// `DELETE /api/products/{id}` (admin)
async fn delete_product(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    state.products().delete(&admin.access_token, id).await?;

    tracing::info!(product_id = %id, admin = %admin.user.email, "Product deleted");
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/catalog/options`
async fn catalog_options() -> Json<Value> {
    Json(json!({
        "sizes": vocab::PRODUCT_SIZES,
        "colors": vocab::PRODUCT_COLORS,
        "categories": vocab::PRODUCT_CATEGORIES,
    }))
}
