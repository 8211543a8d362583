//! Platform auth boundary client.
//!
//! Token-based authentication against the platform's `/auth/v1` endpoint
//! group: password and refresh grants, sign-up, sign-out, token
//! introspection, recovery email, and OAuth redirect initiation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::PlatformConfig;
use crate::models::{AuthUser, PlatformSession};

use super::{PlatformError, check_status};

/// Result of a sign-up: the platform always returns the account, and a
/// session when the project auto-confirms emails.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    #[serde(default)]
    pub session: Option<PlatformSession>,
}

/// Operations the session synchronizer needs from the auth boundary.
///
/// Implemented by [`AuthClient`] for the wire and by in-memory fakes in
/// tests.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email + password for a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PlatformSession, PlatformError>;

    /// Register a new account.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignUpOutcome, PlatformError>;

    /// Invalidate the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), PlatformError>;

    /// Confirm the platform still accepts `access_token` and return the
    /// owning account.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, PlatformError>;

    /// Exchange a refresh token for a replacement session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<PlatformSession, PlatformError>;

    /// Send a password recovery email.
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), PlatformError>;
}

#[async_trait]
impl<T> AuthApi for std::sync::Arc<T>
where
    T: AuthApi + ?Sized,
{
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PlatformSession, PlatformError> {
        (**self).sign_in_with_password(email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignUpOutcome, PlatformError> {
        (**self).sign_up(email, password, name).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), PlatformError> {
        (**self).sign_out(access_token).await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, PlatformError> {
        (**self).get_user(access_token).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<PlatformSession, PlatformError> {
        (**self).refresh_session(refresh_token).await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), PlatformError> {
        (**self).reset_password_for_email(email, redirect_to).await
    }
}

/// Client for the platform's auth endpoint group.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl AuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_owned(),
                publishable_key: config.publishable_key.clone(),
            }),
        }
    }

    /// Generate the OAuth authorization URL for a provider redirect.
    ///
    /// The platform handles state and PKCE; the storefront only forwards
    /// the browser. `redirect_to` is where the platform sends the browser
    /// after the provider round-trip.
    #[must_use]
    pub fn authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        let mut url = format!("{}/auth/v1/authorize", self.inner.base_url);
        // Infallible for our own base + literal path; fall back to the
        // bare endpoint if the configured URL is somehow unparseable.
        if let Ok(mut parsed) = url::Url::parse(&url) {
            parsed
                .query_pairs_mut()
                .append_pair("provider", provider)
                .append_pair("redirect_to", redirect_to);
            url = parsed.into();
        }
        url
    }

    /// Probe the auth endpoint group's health endpoint.
    ///
    /// Used by the readiness check and the CLI to confirm the platform is
    /// reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), PlatformError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("/auth/v1/health"))
            .header("apikey", self.apikey())
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn apikey(&self) -> &str {
        &self.inner.publishable_key
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PlatformSession, PlatformError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", self.apikey())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let session = check_status(response).await?.json().await?;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<SignUpOutcome, PlatformError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/signup"))
            .header("apikey", self.apikey())
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": name, "name": name },
            }))
            .send()
            .await?;

        let outcome = check_status(response).await?.json().await?;
        Ok(outcome)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), PlatformError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", self.apikey())
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, PlatformError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("/auth/v1/user"))
            .header("apikey", self.apikey())
            .bearer_auth(access_token)
            .send()
            .await?;

        let user = check_status(response).await?.json().await?;
        Ok(user)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<PlatformSession, PlatformError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.apikey())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let session = check_status(response).await?.json().await?;
        Ok(session)
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/v1/recover"))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", self.apikey())
            .json(&json!({ "email": email }))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client() -> AuthClient {
        AuthClient::new(&PlatformConfig {
            url: "https://project.platform.test/".into(),
            publishable_key: "pk_test".into(),
            service_key: SecretString::from("sk_test"),
        })
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = client();
        assert_eq!(
            client.endpoint("/auth/v1/user"),
            "https://project.platform.test/auth/v1/user"
        );
    }

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let url = client().authorize_url("google", "https://shop.example/auth/callback?next=/profile");
        assert!(url.starts_with("https://project.platform.test/auth/v1/authorize?"));
        assert!(url.contains("provider=google"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fshop.example%2Fauth%2Fcallback"));
    }
}
