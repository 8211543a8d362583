//! HTTP route handlers for the storefront API.
//!
//! All responses are JSON; there is no HTML rendering layer.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (platform reachability)
//!
//! # Catalog
//! GET    /api/products         - Product listing + filter bootstrap data
//! GET    /api/products/{id}    - Single product
//! POST   /api/products         - Create product (admin)
//! PUT    /api/products/{id}    - Update product (admin)
//! DELETE /api/products/{id}    - Delete product (admin)
//! GET    /api/catalog/options  - Size/color/category vocabularies
//!
//! # Auth
//! POST /api/auth/signin        - Email + password sign-in
//! POST /api/auth/signup        - Account registration
//! POST /api/auth/signout       - Session revocation
//! GET  /api/auth/session       - Token introspection
//! POST /api/auth/reset         - Password recovery email
//! POST /api/auth/oauth         - OAuth redirect URL
//!
//! # Profile (requires auth)
//! GET  /api/user/profile       - Own profile record
//! PUT  /api/user/profile       - Update own profile
//!
//! # Upload (requires auth)
//! POST /api/upload             - Image upload, returns public URL
//! ```

pub mod auth;
pub mod products;
pub mod profile;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(auth::routes())
        .merge(profile::routes())
        .merge(upload::routes())
}
