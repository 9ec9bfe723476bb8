//! Configuration types for a Shopify app.
//!
//! # Overview
//!
//! - [`ShopifyConfig`]: everything the OAuth flow and API clients need
//! - [`ShopifyConfigBuilder`]: validating builder for [`ShopifyConfig`]
//! - [`RetryPolicy`]: throttled-call retry bounds
//! - [`ApiKey`], [`ApiSecretKey`], [`PrivateKey`]: credentials (secrets are
//!   masked in `Debug`)
//! - [`ShopDomain`], [`HostUrl`]: validated domain and URL values
//! - [`ApiVersion`]: the Admin API version used in request paths
//!
//! Configuration is instance-based. Loading it from files or the environment
//! is left to the host application.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{ShopifyConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .app_scopes("write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri().unwrap(), "https://myapp.example.com/callback");
//! ```

mod newtypes;
mod retry;
mod version;

use std::time::Duration;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, PrivateKey, ShopDomain};
pub use retry::RetryPolicy;
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Application-wide settings.
///
/// Cheap to clone and safe to share across tasks.
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    private_key: PrivateKey,
    app_scopes: AuthScopes,
    user_scopes: AuthScopes,
    host: Option<HostUrl>,
    callback_path: String,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
    retry_policy: RetryPolicy,
    nonce_ttl: Duration,
}

impl ShopifyConfig {
    /// Default lifetime of an OAuth nonce.
    pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(600);

    /// Default path the platform redirects back to.
    pub const DEFAULT_CALLBACK_PATH: &'static str = "/callback";

    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// The app's public API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// The app's API secret.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Key used to sign OAuth nonces. Defaults to the API secret.
    #[must_use]
    pub const fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Scopes requested by the offline (store-level) install.
    #[must_use]
    pub const fn app_scopes(&self) -> &AuthScopes {
        &self.app_scopes
    }

    /// Scopes requested by the online (per-user) login.
    #[must_use]
    pub const fn user_scopes(&self) -> &AuthScopes {
        &self.user_scopes
    }

    /// The app's public URL.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Path appended to [`host`](Self::host) to form the OAuth `redirect_uri`.
    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// The full OAuth `redirect_uri`, if a host is configured.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<String> {
        self.host
            .as_ref()
            .map(|host| format!("{}{}", host.as_ref(), self.callback_path))
    }

    /// Admin API version used in request paths.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Origin override for every outbound platform call.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Base URL for platform calls on behalf of `store`.
    ///
    /// `https://{store}` unless an [`api_host`](Self::api_host) override is set.
    #[must_use]
    pub fn store_base_uri(&self, store: &ShopDomain) -> String {
        self.api_host.as_ref().map_or_else(
            || format!("https://{}", store.as_ref()),
            |host| host.origin().to_string(),
        )
    }

    /// Optional prefix prepended to the User-Agent header.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Retry bounds for throttled calls.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Lifetime of OAuth nonces.
    #[must_use]
    pub const fn nonce_ttl(&self) -> Duration {
        self.nonce_ttl
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for [`ShopifyConfig`].
///
/// `api_key` and `api_secret_key` are required; everything else has a default.
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    private_key: Option<PrivateKey>,
    app_scopes: Option<AuthScopes>,
    user_scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    callback_path: Option<String>,
    api_version: Option<ApiVersion>,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
    retry_policy: Option<RetryPolicy>,
    nonce_ttl: Option<Duration>,
}

impl ShopifyConfigBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets a dedicated nonce signing key.
    #[must_use]
    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Sets the offline install scopes.
    #[must_use]
    pub fn app_scopes(mut self, scopes: AuthScopes) -> Self {
        self.app_scopes = Some(scopes);
        self
    }

    /// Sets the online login scopes.
    #[must_use]
    pub fn user_scopes(mut self, scopes: AuthScopes) -> Self {
        self.user_scopes = Some(scopes);
        self
    }

    /// Sets the app's public URL.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the callback path (validated in [`build`](Self::build)).
    #[must_use]
    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sends every platform call to this origin instead of the store domain.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets a User-Agent prefix.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the retry policy for throttled calls.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the OAuth nonce lifetime.
    #[must_use]
    pub const fn nonce_ttl(mut self, ttl: Duration) -> Self {
        self.nonce_ttl = Some(ttl);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] when `api_key` or
    ///   `api_secret_key` was never set
    /// - [`ConfigError::InvalidCallbackPath`] when the callback path is not
    ///   absolute
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let callback_path = self
            .callback_path
            .unwrap_or_else(|| ShopifyConfig::DEFAULT_CALLBACK_PATH.to_string());
        if !callback_path.starts_with('/') {
            return Err(ConfigError::InvalidCallbackPath {
                path: callback_path,
            });
        }

        let private_key = self
            .private_key
            .unwrap_or_else(|| PrivateKey::from(&api_secret_key));

        Ok(ShopifyConfig {
            api_key,
            api_secret_key,
            private_key,
            app_scopes: self.app_scopes.unwrap_or_default(),
            user_scopes: self.user_scopes.unwrap_or_default(),
            host: self.host,
            callback_path,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            api_host: self.api_host,
            user_agent_prefix: self.user_agent_prefix,
            retry_policy: self.retry_policy.unwrap_or_default(),
            nonce_ttl: self.nonce_ttl.unwrap_or(ShopifyConfig::DEFAULT_NONCE_TTL),
        })
    }
}
