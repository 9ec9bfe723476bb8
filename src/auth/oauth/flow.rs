//! The install and login flow.
//!
//! [`OAuthFlow::install`] produces the authorization URL the merchant is
//! redirected to. Its `state` parameter is a signed nonce carrying the store
//! and the flow kind, so no server-side state is needed between the two legs.
//! [`OAuthFlow::callback`] verifies that nonce, exchanges the authorization
//! code, builds the [`Token`] and hands it to the host's [`CompletionHooks`]
//! before returning it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::auth::oauth::error::HookError;
use crate::auth::oauth::exchange::exchange_authorization_code;
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::{AuthQuery, OAuthError};
use crate::auth::{NonceCodec, OfflineToken, OnlineToken, Token, TokenError};
use crate::config::{ShopDomain, ShopifyConfig};

/// Future returned by completion hooks.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send + 'a>>;

/// Host callbacks invoked once a token has been obtained.
///
/// The flow awaits the hook before returning, so a hook that persists the
/// token (typically via [`Token::save`]) has finished when `callback` resolves.
pub trait CompletionHooks: Send + Sync {
    /// Called after an app-level (offline) install.
    fn post_install<'a>(&'a self, store: &'a ShopDomain, token: &'a OfflineToken) -> HookFuture<'a>;

    /// Called after a user-level (online) login.
    fn post_login<'a>(&'a self, store: &'a ShopDomain, token: &'a OnlineToken) -> HookFuture<'a>;
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl CompletionHooks for NoopHooks {
    fn post_install<'a>(&'a self, _: &'a ShopDomain, _: &'a OfflineToken) -> HookFuture<'a> {
        Box::pin(async { Ok(()) })
    }

    fn post_login<'a>(&'a self, _: &'a ShopDomain, _: &'a OnlineToken) -> HookFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}

/// Where a flow stands. Reported through `tracing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Init,
    AwaitingCallback,
    Completed,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::AwaitingCallback => "awaiting_callback",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Output of [`OAuthFlow::install`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the merchant to.
    pub redirect_url: String,
    /// The `state` nonce embedded in `redirect_url`.
    pub nonce: String,
    /// Whether this requests a user-level token.
    pub is_online: bool,
}

/// What the install step signs into the nonce.
#[derive(Debug, Serialize, Deserialize)]
struct NoncePayload {
    store_domain: String,
    is_online: bool,
}

/// Drives the authorization-code flow for one app.
///
/// # Example
///
/// ```rust
/// use shopify_app::auth::oauth::{NoopHooks, OAuthFlow};
/// use shopify_app::{ApiKey, ApiSecretKey, HostUrl, ShopDomain, ShopifyConfig};
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://app.example.com").unwrap())
///     .app_scopes("write_orders".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let flow = OAuthFlow::new(config, NoopHooks);
/// let request = flow
///     .install(&ShopDomain::new("my-store").unwrap(), false)
///     .unwrap();
/// assert!(request
///     .redirect_url
///     .starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
/// ```
pub struct OAuthFlow<H> {
    config: ShopifyConfig,
    codec: NonceCodec,
    hooks: H,
    http: reqwest::Client,
    cancel: CancellationToken,
}

impl<H: CompletionHooks> OAuthFlow<H> {
    /// Creates a flow signing nonces with the config's private key.
    #[must_use]
    pub fn new(config: ShopifyConfig, hooks: H) -> Self {
        let codec = NonceCodec::new(config.private_key().as_bytes());
        Self {
            config,
            codec,
            hooks,
            http: reqwest::Client::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Ties the flow to `cancel`. Once cancelled, callbacks fail with
    /// [`OAuthError::Cancelled`] and no hook fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Builds the authorization redirect for `store`.
    ///
    /// Offline installs request the app scopes; online logins request the
    /// user scopes and add `grant_options[]=per-user`.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::MissingHostConfig`] if no public host is configured
    /// - [`OAuthError::InvalidNonce`] if the nonce cannot be signed
    pub fn install(
        &self,
        store: &ShopDomain,
        is_online: bool,
    ) -> Result<AuthorizationRequest, OAuthError> {
        let redirect_uri = self
            .config
            .redirect_uri()
            .ok_or(OAuthError::MissingHostConfig)?;

        let payload = serde_json::to_string(&NoncePayload {
            store_domain: store.as_ref().to_string(),
            is_online,
        })
        .map_err(|_| OAuthError::InvalidNonce)?;
        let nonce = self.codec.encode(&payload, self.config.nonce_ttl())?;

        let scopes = if is_online {
            self.config.user_scopes()
        } else {
            self.config.app_scopes()
        };
        let scope = scopes.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.config.api_key().as_ref()),
            ("scope", scope.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("state", nonce.as_str()),
        ];
        if is_online {
            params.push(("grant_options[]", "per-user"));
        }

        let query = params
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");

        tracing::debug!(
            store = %store,
            is_online,
            state = %FlowState::AwaitingCallback,
            "authorization requested"
        );

        Ok(AuthorizationRequest {
            redirect_url: format!("https://{}/admin/oauth/authorize?{query}", store.as_ref()),
            nonce,
            is_online,
        })
    }

    /// Completes the flow for `store` with the returned `nonce` and `code`.
    ///
    /// The nonce is checked before any network call, so a forged or
    /// mismatched callback never spends the code.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::InvalidNonce`] / [`OAuthError::ExpiredNonce`]
    /// - [`OAuthError::NonceMismatch`] if the nonce names another store
    /// - [`OAuthError::TokenExchangeFailed`] if the code exchange fails
    /// - [`OAuthError::Completion`] if the host hook fails
    /// - [`OAuthError::Cancelled`] if the flow is cancelled first
    pub async fn callback(
        &self,
        store: &ShopDomain,
        nonce: &str,
        code: &str,
    ) -> Result<Token, OAuthError> {
        let result = self.complete(store, nonce, code).await;
        match &result {
            Ok(token) => tracing::debug!(
                store = %store,
                online = token.is_online(),
                state = %FlowState::Completed,
                "oauth flow finished"
            ),
            Err(error) => tracing::debug!(
                store = %store,
                kind = error.kind(),
                state = %FlowState::Failed,
                "oauth flow finished"
            ),
        }
        result
    }

    /// Verifies the callback's HMAC signature, then runs
    /// [`callback`](Self::callback).
    ///
    /// # Errors
    ///
    /// [`OAuthError::InvalidHmac`] for a bad signature,
    /// [`OAuthError::InvalidCallback`] for an invalid `shop`, plus every
    /// [`callback`](Self::callback) error.
    pub async fn callback_with_query(&self, query: &AuthQuery) -> Result<Token, OAuthError> {
        if !validate_hmac(query, self.config.api_secret_key().as_ref()) {
            tracing::debug!(shop = %query.shop, state = %FlowState::Failed, "callback hmac rejected");
            return Err(OAuthError::InvalidHmac);
        }

        let store = ShopDomain::new(&query.shop).map_err(|e| OAuthError::InvalidCallback {
            reason: e.to_string(),
        })?;

        self.callback(&store, &query.state, &query.code).await
    }

    /// Where to send the merchant once `token` has been obtained.
    ///
    /// After an offline install with user scopes configured, that is the
    /// online login; otherwise the app's page in the store admin.
    ///
    /// # Errors
    ///
    /// Propagates [`install`](Self::install) errors.
    pub fn next_redirect(&self, token: &Token) -> Result<String, OAuthError> {
        let store = token.store_domain();
        if !token.is_online() && !self.config.user_scopes().is_empty() {
            return Ok(self.install(store, true)?.redirect_url);
        }
        Ok(format!(
            "https://{}/admin/apps/{}",
            store.as_ref(),
            self.config.api_key().as_ref()
        ))
    }

    async fn complete(
        &self,
        store: &ShopDomain,
        nonce: &str,
        code: &str,
    ) -> Result<Token, OAuthError> {
        let payload = self.codec.decode(nonce)?;
        let payload: NoncePayload =
            serde_json::from_str(&payload).map_err(|_| OAuthError::InvalidNonce)?;

        if !constant_time_compare(&payload.store_domain, store.as_ref()) {
            return Err(OAuthError::NonceMismatch {
                expected: payload.store_domain,
                received: store.as_ref().to_string(),
            });
        }

        let issued_at = Utc::now();
        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(OAuthError::Cancelled),
            response = exchange_authorization_code(&self.http, &self.config, store, code) => response?,
        };

        if self.cancel.is_cancelled() {
            return Err(OAuthError::Cancelled);
        }

        let token = if payload.is_online {
            let token = OnlineToken::from_response(store.clone(), &response, issued_at)
                .map_err(invalid_response)?;
            self.hooks
                .post_login(store, &token)
                .await
                .map_err(|source| OAuthError::Completion {
                    hook: "post_login",
                    source,
                })?;
            Token::Online(token)
        } else {
            let token =
                OfflineToken::from_response(store.clone(), &response).map_err(invalid_response)?;
            self.hooks
                .post_install(store, &token)
                .await
                .map_err(|source| OAuthError::Completion {
                    hook: "post_install",
                    source,
                })?;
            Token::Offline(token)
        };

        Ok(token)
    }
}

impl<H> fmt::Debug for OAuthFlow<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthFlow")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn invalid_response(error: TokenError) -> OAuthError {
    OAuthError::TokenExchangeFailed {
        status: 200,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};

    fn config() -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host(HostUrl::new("https://app.example.com").unwrap())
            .app_scopes("write_orders".parse().unwrap())
            .user_scopes("read_orders".parse().unwrap())
            .build()
            .unwrap()
    }

    fn store() -> ShopDomain {
        ShopDomain::new("shop.example.com").unwrap()
    }

    #[test]
    fn test_install_offline_url() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let request = flow.install(&store(), false).unwrap();

        assert!(request
            .redirect_url
            .starts_with("https://shop.example.com/admin/oauth/authorize?"));
        assert!(request.redirect_url.contains("client_id=test-api-key"));
        assert!(request.redirect_url.contains("scope=write_orders"));
        assert!(request
            .redirect_url
            .contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
        assert!(request
            .redirect_url
            .contains(&format!("state={}", urlencoding::encode(&request.nonce))));
        assert!(!request.redirect_url.contains("grant_options"));
        assert!(!request.is_online);
    }

    #[test]
    fn test_install_online_uses_user_scopes_and_per_user_grant() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let request = flow.install(&store(), true).unwrap();

        assert!(request.redirect_url.contains("scope=read_orders"));
        assert!(request.redirect_url.contains("grant_options%5B%5D=per-user"));
    }

    #[test]
    fn test_install_nonce_carries_store_and_kind() {
        let config = config();
        let codec = NonceCodec::new(config.private_key().as_bytes());
        let flow = OAuthFlow::new(config, NoopHooks);

        let request = flow.install(&store(), false).unwrap();
        let payload: serde_json::Value =
            serde_json::from_str(&codec.decode(&request.nonce).unwrap()).unwrap();

        assert_eq!(payload["store_domain"], "shop.example.com");
        assert_eq!(payload["is_online"], false);
    }

    #[test]
    fn test_install_without_host_fails() {
        let config = ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .build()
            .unwrap();
        let flow = OAuthFlow::new(config, NoopHooks);

        assert!(matches!(
            flow.install(&store(), false),
            Err(OAuthError::MissingHostConfig)
        ));
    }

    #[tokio::test]
    async fn test_callback_rejects_nonce_for_other_store() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let request = flow.install(&store(), false).unwrap();
        let other = ShopDomain::new("other.example.com").unwrap();

        match flow.callback(&other, &request.nonce, "any-code").await {
            Err(OAuthError::NonceMismatch { expected, received }) => {
                assert_eq!(expected, "shop.example.com");
                assert_eq!(received, "other.example.com");
            }
            other => panic!("Expected NonceMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_callback_rejects_forged_nonce() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let forged = NonceCodec::new(b"another-key")
            .encode(
                r#"{"store_domain":"shop.example.com","is_online":false}"#,
                std::time::Duration::from_secs(60),
            )
            .unwrap();

        assert!(matches!(
            flow.callback(&store(), &forged, "code").await,
            Err(OAuthError::InvalidNonce)
        ));
    }

    #[tokio::test]
    async fn test_callback_rejects_foreign_payload() {
        let config = config();
        let codec = NonceCodec::new(config.private_key().as_bytes());
        let flow = OAuthFlow::new(config, NoopHooks);
        let nonce = codec
            .encode("not json", std::time::Duration::from_secs(60))
            .unwrap();

        assert!(matches!(
            flow.callback(&store(), &nonce, "code").await,
            Err(OAuthError::InvalidNonce)
        ));
    }

    #[tokio::test]
    async fn test_cancelled_flow_does_not_exchange() {
        let cancel = CancellationToken::new();
        let flow = OAuthFlow::new(config(), NoopHooks).with_cancellation(cancel.clone());
        let request = flow.install(&store(), false).unwrap();
        cancel.cancel();

        assert!(matches!(
            flow.callback(&store(), &request.nonce, "code").await,
            Err(OAuthError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_callback_with_query_rejects_bad_hmac() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let mut query = AuthQuery::new("code", "shop.example.com", "state", "1700000000");
        query.hmac = "deadbeef".to_string();

        assert!(matches!(
            flow.callback_with_query(&query).await,
            Err(OAuthError::InvalidHmac)
        ));
    }

    #[tokio::test]
    async fn test_callback_with_query_rejects_invalid_shop() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let mut query = AuthQuery::new("code", "not a shop!", "state", "1700000000");
        query.hmac = crate::auth::oauth::compute_signature(&query.to_signable_string(), "test-secret");

        assert!(matches!(
            flow.callback_with_query(&query).await,
            Err(OAuthError::InvalidCallback { .. })
        ));
    }

    #[test]
    fn test_next_redirect_after_install_is_online_login() {
        let flow = OAuthFlow::new(config(), NoopHooks);
        let token = Token::Offline(OfflineToken::new(
            store(),
            "token",
            "write_orders".parse().unwrap(),
        ));

        let redirect = flow.next_redirect(&token).unwrap();
        assert!(redirect.contains("/admin/oauth/authorize?"));
        assert!(redirect.contains("grant_options%5B%5D=per-user"));
    }

    #[test]
    fn test_next_redirect_without_user_scopes_is_app_page() {
        let config = ShopifyConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host(HostUrl::new("https://app.example.com").unwrap())
            .build()
            .unwrap();
        let flow = OAuthFlow::new(config, NoopHooks);
        let token = Token::Offline(OfflineToken::new(store(), "token", Default::default()));

        assert_eq!(
            flow.next_redirect(&token).unwrap(),
            "https://shop.example.com/admin/apps/test-api-key"
        );
    }

    #[test]
    fn test_flow_state_display() {
        assert_eq!(FlowState::AwaitingCallback.to_string(), "awaiting_callback");
        assert_eq!(FlowState::Failed.to_string(), "failed");
    }
}
