//! Product filtering and price-range reconciliation.
//!
//! A [`FilterState`] holds the user's selections for one browsing session:
//! size and color sets plus a price sub-range constrained by a
//! catalog-derived bounding range. The bounding range moves when the
//! category changes; an existing sub-range is clamped into the new bounds
//! rather than reset, so selections survive category switches.
//!
//! State is an explicit value, not process-global: every browsing session
//! (and every test) constructs its own.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use juniper_core::PriceRange;

use crate::models::Product;

/// Filter criteria for one browsing session.
///
/// Invariant: whenever both ranges are present, the sub-range lies within
/// the bounding range. [`FilterState::set_price_range`] maintains this;
/// [`FilterState::set_price_filter`] trusts its caller (the range control
/// cannot produce out-of-bounds values) and does not re-validate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected sizes; empty means the size dimension passes everything.
    pub selected_sizes: BTreeSet<String>,
    /// Selected colors; empty means the color dimension passes everything.
    pub selected_colors: BTreeSet<String>,
    /// User-adjusted price sub-range.
    pub price_filter: Option<PriceRange>,
    /// Catalog-derived bounding range for the products currently in view.
    pub price_range: Option<PriceRange>,
}

impl FilterState {
    /// Create an empty filter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the bounding range, reconciling the sub-range.
    ///
    /// With no sub-range set, the sub-range initializes to the full new
    /// range. An existing sub-range has each bound clamped independently
    /// into the new range; it is rewritten only when the clamped pair
    /// differs from the current one.
    ///
    /// Returns `true` if the sub-range was written.
    pub fn set_price_range(&mut self, new_range: PriceRange) -> bool {
        self.price_range = Some(new_range);

        match self.price_filter {
            None => {
                self.price_filter = Some(new_range);
                true
            }
            Some(current) => {
                let clamped = current.clamped_into(&new_range);
                if clamped == current {
                    false
                } else {
                    self.price_filter = Some(clamped);
                    true
                }
            }
        }
    }

    /// Overwrite the price sub-range directly.
    ///
    /// The caller (a range control) guarantees `lo <= hi`; the value is
    /// not re-clamped against the bounding range on this path.
    pub fn set_price_filter(&mut self, range: PriceRange) {
        self.price_filter = Some(range);
    }

    /// Toggle a size in the selection set: add if absent, remove if
    /// present.
    pub fn toggle_size(&mut self, size: &str) {
        if !self.selected_sizes.remove(size) {
            self.selected_sizes.insert(size.to_owned());
        }
    }

    /// Toggle a color in the selection set: add if absent, remove if
    /// present.
    pub fn toggle_color(&mut self, color: &str) {
        if !self.selected_colors.remove(color) {
            self.selected_colors.insert(color.to_owned());
        }
    }

    /// Clear both selection sets and widen the sub-range back to the full
    /// bounding range.
    pub fn reset(&mut self) {
        self.selected_sizes.clear();
        self.selected_colors.clear();
        self.price_filter = self.price_range;
    }

    /// The price range a filtering pass actually applies: the sub-range
    /// when set, else the bounding range, else unconstrained.
    #[must_use]
    pub fn effective_price_filter(&self) -> Option<PriceRange> {
        self.price_filter.or(self.price_range)
    }

    /// Whether `product` passes every dimension.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(range) = self.effective_price_filter()
            && !range.contains(product.price.amount)
        {
            return false;
        }

        if !self.selected_sizes.is_empty()
            && !self.selected_sizes.iter().any(|s| product.has_size(s))
        {
            return false;
        }

        if !self.selected_colors.is_empty()
            && !self.selected_colors.iter().any(|c| product.has_color(c))
        {
            return false;
        }

        true
    }
}

/// Narrow `products` to those passing `filters`.
///
/// Pure and order-preserving: the output borrows from the input in input
/// order, and filtering an already-filtered list is a no-op.
#[must_use]
pub fn apply_filters<'a>(products: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
    products.iter().filter(|p| filters.matches(p)).collect()
}

/// The bounding price range of a product list: `[min, max]` over all
/// prices. `None` for an empty list.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<PriceRange> {
    let mut amounts = products.iter().map(|p| p.price.amount);
    let first = amounts.next()?;
    let (lo, hi) = amounts.fold((first, first), |(lo, hi), amount| {
        (lo.min(amount), hi.max(amount))
    });
    Some(PriceRange::new(lo, hi))
}

/// All sizes offered by any product in the list, sorted and deduplicated.
#[must_use]
pub fn distinct_sizes(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .flat_map(|p| p.available_sizes.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// All colors offered by any product in the list, sorted and deduplicated.
#[must_use]
pub fn distinct_colors(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .flat_map(|p| p.available_colors.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
