//! End-to-end filter engine tests: platform wire records through domain
//! conversion into the filtering pass.

use rust_decimal::Decimal;

use juniper_core::PriceRange;
use juniper_storefront::catalog::{FilterState, apply_filters, distinct_colors, price_bounds};
use juniper_storefront::models::Product;
use juniper_storefront::platform::ProductRecord;

fn record_json(name: &str, amount: &str, sizes: &[&str], colors: &[&str]) -> String {
    format!(
        r#"{{
            "id": "{}",
            "name": "{name}",
            "amount": "{amount}",
            "currency": "USD",
            "images": [],
            "available_sizes": {sizes:?},
            "available_colors": {colors:?},
            "category": "Shirts",
            "created_at": "2026-01-15T10:00:00Z"
        }}"#,
        uuid_for(name),
    )
}

/// Deterministic UUID per product name so assertions can refer to rows.
fn uuid_for(name: &str) -> String {
    let mut bytes = [0_u8; 16];
    for (i, b) in name.bytes().enumerate() {
        bytes[i % 16] ^= b;
    }
    // Set version/variant bits so the string parses as a v4 UUID.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes).to_string()
}

fn catalog() -> Vec<Product> {
    [
        record_json("Poplin Shirt", "45.00", &["S", "M", "L"], &["White", "Blue"]),
        record_json("Flannel Shirt", "58.50", &["M", "L", "XL"], &["Red", "Plaid"]),
        record_json("Silk Blouse", "120.00", &["XS", "S"], &["White", "Coral"]),
        record_json("Oxford Shirt", "45.00", &["S", "M"], &["Blue"]),
    ]
    .into_iter()
    .map(|json| {
        let record: ProductRecord = serde_json::from_str(&json).expect("record JSON");
        Product::from(record)
    })
    .collect()
}

fn names(products: &[&Product]) -> Vec<String> {
    products.iter().map(|p| p.name.clone()).collect()
}

fn range(lo: i64, hi: i64) -> PriceRange {
    PriceRange::new(Decimal::from(lo), Decimal::from(hi))
}

#[test]
fn test_records_filter_through_domain_conversion() {
    let catalog = catalog();
    let mut filters = FilterState::new();
    filters.toggle_color("White");

    let visible = apply_filters(&catalog, &filters);
    assert_eq!(names(&visible), ["Poplin Shirt", "Silk Blouse"]);
}

#[test]
fn test_bounds_feed_the_clamp_cycle() {
    // The products route derives bounds from the fetched page; a category
    // switch produces new bounds and the user's sub-range must survive,
    // clamped.
    let catalog = catalog();
    let bounds = price_bounds(&catalog).expect("bounds");
    assert_eq!(bounds, range(45, 120));

    let mut filters = FilterState::new();
    filters.set_price_range(bounds);
    filters.set_price_filter(range(50, 100));

    // Category switch: tighter catalog. [50,100] clamps to [58,90].
    filters.set_price_range(range(58, 90));
    assert_eq!(filters.price_filter, Some(range(58, 90)));

    let visible = apply_filters(&catalog, &filters);
    assert_eq!(names(&visible), ["Flannel Shirt"]);
}

#[test]
fn test_spec_worked_clamp_example() {
    // priceRange [10,100], priceFilter [20,80]; new range [30,90]
    // => filter [30,80].
    let mut filters = FilterState::new();
    filters.set_price_range(range(10, 100));
    filters.set_price_filter(range(20, 80));

    assert!(filters.set_price_range(range(30, 90)));
    assert_eq!(filters.price_filter, Some(range(30, 80)));
}

#[test]
fn test_filtering_preserves_input_order_and_price_ties() {
    let catalog = catalog();
    let mut filters = FilterState::new();
    filters.set_price_filter(range(45, 45));

    // Degenerate range keeps both 45.00 products, in input order.
    let visible = apply_filters(&catalog, &filters);
    assert_eq!(names(&visible), ["Poplin Shirt", "Oxford Shirt"]);
}

#[test]
fn test_selection_sets_treat_wire_values_as_opaque() {
    let catalog = catalog();
    // "Plaid" is a pattern, not a color; the engine does not care.
    let mut filters = FilterState::new();
    filters.toggle_color("Plaid");
    let visible = apply_filters(&catalog, &filters);
    assert_eq!(names(&visible), ["Flannel Shirt"]);

    assert!(distinct_colors(&catalog).contains(&"Plaid".to_owned()));
}
