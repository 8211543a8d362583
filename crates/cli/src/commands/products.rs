//! Catalog product commands.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use tracing::info;

use juniper_storefront::config::PlatformConfig;
use juniper_storefront::platform::{ProductInsert, ProductQuery, ProductStore};

/// List catalog products, newest first.
///
/// # Errors
///
/// Returns an error if configuration is missing or the platform request
/// fails.
pub async fn list(
    category: Option<String>,
    limit: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = PlatformConfig::from_env()?;
    let products = ProductStore::new(&config);

    let query = ProductQuery {
        category,
        limit,
        offset: None,
    };
    let records = products.list(&query).await?;

    info!(count = records.len(), "Products");
    for record in records {
        info!(
            id = %record.id,
            name = %record.name,
            amount = %record.amount,
            currency = %record.currency,
            category = record.category.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Insert a small sample catalog for development projects.
///
/// # Errors
///
/// Returns an error if configuration is missing or an insert is rejected.
pub async fn seed() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = PlatformConfig::from_env()?;
    let products = ProductStore::new(&config);
    let service_key = config.service_key.expose_secret();

    for insert in sample_products() {
        let record = products.create(service_key, &insert).await?;
        info!(id = %record.id, name = %record.name, "Seeded product");
    }
    Ok(())
}

fn sample_products() -> Vec<ProductInsert> {
    let product = |name: &str, cents: i64, category: &str, sizes: &[&str], colors: &[&str]| {
        ProductInsert {
            name: name.to_owned(),
            amount: Decimal::new(cents, 2),
            currency: "USD".to_owned(),
            description: None,
            main_image_url: None,
            images: Vec::new(),
            available_sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
            available_colors: colors.iter().map(|c| (*c).to_owned()).collect(),
            category: Some(category.to_owned()),
        }
    };

    vec![
        product(
            "Organic Cotton Tee",
            2400,
            "T-Shirts",
            &["XS", "S", "M", "L", "XL"],
            &["Black", "White", "Olive"],
        ),
        product(
            "Selvedge Denim Jeans",
            9800,
            "Jeans",
            &["30", "32", "34", "36"],
            &["Denim", "Black"],
        ),
        product(
            "Linen Summer Dress",
            7200,
            "Dresses",
            &["4", "6", "8", "10"],
            &["White", "Coral", "Navy"],
        ),
        product(
            "Wool Overcoat",
            18900,
            "Coats",
            &["S", "M", "L"],
            &["Gray", "Navy"],
        ),
        product(
            "Canvas Tote",
            3500,
            "Bags",
            &["One Size"],
            &["Beige", "Black"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products_are_well_formed() {
        let samples = sample_products();
        assert!(!samples.is_empty());
        for insert in samples {
            assert!(!insert.name.is_empty());
            assert!(insert.amount > Decimal::ZERO);
            assert!(!insert.available_sizes.is_empty());
            assert!(!insert.available_colors.is_empty());
        }
    }
}
