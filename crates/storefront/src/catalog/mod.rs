//! Catalog browsing logic.
//!
//! The filter engine narrows an already-fetched product list entirely in
//! memory; the platform is only consulted to fetch the list itself.
//!
//! - [`filter`] - filter criteria container and the pure filtering pass
//! - [`vocab`] - canonical size/color/category vocabularies for forms

pub mod filter;
pub mod vocab;

pub use filter::{FilterState, apply_filters, distinct_colors, distinct_sizes, price_bounds};
