//! OAuth authorization-code flow.
//!
//! 1. [`OAuthFlow::install`] builds the authorization URL. Its `state` is a
//!    signed nonce, so nothing is stored between the redirect and the callback.
//! 2. The platform redirects back with `code`, `shop`, `state`, `timestamp`
//!    and `hmac`. [`OAuthFlow::callback_with_query`] verifies the HMAC, then
//!    [`OAuthFlow::callback`] verifies the nonce, exchanges the code and
//!    hands the [`Token`](crate::Token) to the host's [`CompletionHooks`].
//!
//! # Security
//!
//! - Callback signatures are HMAC-SHA256 over the sorted query parameters
//! - Nonces are HS256 JWTs with an expiry, bound to the store they were
//!   issued for
//! - Signature and store comparisons are constant-time
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_app::auth::oauth::{AuthQuery, NoopHooks, OAuthFlow};
//!
//! let flow = OAuthFlow::new(config, NoopHooks);
//!
//! // install handler
//! let request = flow.install(&shop, false)?;
//! // redirect to request.redirect_url
//!
//! // callback handler
//! let token = flow.callback_with_query(&query).await?;
//! let next = flow.next_redirect(&token)?;
//! ```

mod auth_query;
mod error;
mod exchange;
mod flow;
pub mod hmac;

pub use auth_query::AuthQuery;
pub use error::{HookError, OAuthError};
pub use exchange::exchange_authorization_code;
pub use flow::{
    AuthorizationRequest, CompletionHooks, FlowState, HookFuture, NoopHooks, OAuthFlow,
};
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
