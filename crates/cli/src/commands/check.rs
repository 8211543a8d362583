//! Platform reachability check.

use tracing::info;

use juniper_storefront::config::PlatformConfig;
use juniper_storefront::platform::AuthClient;

/// Probe the platform's health endpoint.
///
/// # Errors
///
/// Returns an error if configuration is missing or the platform does not
/// answer healthy.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = PlatformConfig::from_env()?;
    let auth = AuthClient::new(&config);

    auth.health().await?;
    info!(url = %config.url, "Platform is reachable");
    Ok(())
}
