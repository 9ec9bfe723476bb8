//! # Shopify App Toolkit
//!
//! Server-side building blocks for a Shopify app: the OAuth install flow,
//! store credentials, embedded-app session tokens and rate-limited Admin API
//! execution.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`ShopifyConfig`] and [`ShopifyConfigBuilder`]
//! - The OAuth install and login flow via [`auth::oauth::OAuthFlow`], with
//!   stateless signed nonces ([`auth::NonceCodec`]) as the `state` parameter
//! - Offline and online credentials ([`Token`]) persisted through a
//!   host-implemented [`TokenStore`]
//! - Session token verification via [`auth::decode_token_from_header`]
//! - REST and GraphQL execution with throttling and bounded retry via
//!   [`RateLimitedClient`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app::{ApiKey, ApiSecretKey, ApiVersion, HostUrl, ShopifyConfig};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://app.example.com").unwrap())
//!     .app_scopes("read_products,write_orders".parse().unwrap())
//!     .user_scopes("read_orders".parse().unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.redirect_uri().as_deref(),
//!     Some("https://app.example.com/callback")
//! );
//! ```
//!
//! ## Installing the app
//!
//! ```rust,ignore
//! use shopify_app::auth::oauth::{AuthQuery, CompletionHooks, HookFuture, OAuthFlow};
//! use shopify_app::{OfflineToken, OnlineToken, ShopDomain, Token, TokenStore};
//!
//! struct SaveTokens<S>(S);
//!
//! impl<S: TokenStore> CompletionHooks for SaveTokens<S> {
//!     fn post_install<'a>(&'a self, _: &'a ShopDomain, token: &'a OfflineToken) -> HookFuture<'a> {
//!         Box::pin(async move {
//!             Token::from(token.clone()).save(&self.0).await?;
//!             Ok(())
//!         })
//!     }
//!
//!     fn post_login<'a>(&'a self, _: &'a ShopDomain, token: &'a OnlineToken) -> HookFuture<'a> {
//!         Box::pin(async move {
//!             Token::from(token.clone()).save(&self.0).await?;
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let flow = OAuthFlow::new(config, SaveTokens(store));
//!
//! // GET /install?shop=...
//! let request = flow.install(&ShopDomain::new(shop)?, false)?;
//! // redirect to request.redirect_url
//!
//! // GET /callback?code=...&shop=...&state=...&timestamp=...&hmac=...
//! let token = flow.callback_with_query(&query).await?;
//! // redirect to flow.next_redirect(&token)?
//! ```
//!
//! ## Calling the Admin API
//!
//! ```rust,ignore
//! use shopify_app::{HttpMethod, OfflineToken, RateLimitedClient, Token};
//!
//! let token = Token::from(OfflineToken::load(&store, &shop).await?);
//! let client = RateLimitedClient::new(&token, &config)?;
//!
//! let orders = client
//!     .execute_rest(HttpMethod::Get, "orders.json", None, None)
//!     .await?;
//! let response = client
//!     .execute_gql("query { shop { name } }", None, None)
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is passed explicitly
//! - **Fail-fast validation**: newtypes validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: network operations run on Tokio
//! - **No secrets in logs**: credentials are masked in `Debug` output

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;

// Re-export public types at crate root for convenience
pub use auth::{
    AccessTokenResponse, AssociatedUser, AuthScopes, OfflineToken, OnlineToken, StoreError,
    Token, TokenError, TokenStore,
};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, HostUrl, PrivateKey, RetryPolicy, ShopDomain, ShopifyConfig,
    ShopifyConfigBuilder,
};
pub use error::ConfigError;

// Re-export client types
pub use clients::{
    GraphqlError, GraphqlResponse, HttpError, HttpMethod, RateLimitedClient, RestError, Sleeper,
};

// Re-export OAuth types for convenience
pub use auth::oauth::{AuthQuery, CompletionHooks, OAuthError, OAuthFlow};
