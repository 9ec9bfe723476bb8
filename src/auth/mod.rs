//! Authentication: OAuth, tokens, nonces and session tokens.
//!
//! # Overview
//!
//! - [`oauth`]: the install and login flow
//! - [`Token`]: offline (store-level) and online (user-level) credentials
//! - [`TokenStore`]: host-implemented persistence for tokens
//! - [`NonceCodec`]: signed, expiring nonces used as the OAuth `state`
//! - [`decode_token_from_header`]: verification of embedded-app session tokens
//! - [`AuthScopes`]: permission sets
//!
//! # Token kinds
//!
//! - **Offline tokens** belong to the store, never expire and serve
//!   background work. There is one per store.
//! - **Online tokens** belong to one staff member, expire, and carry the
//!   [`AssociatedUser`]. An expired online token is refused before any call
//!   is made and must be replaced through a new login.

mod associated_user;
mod nonce;
pub mod oauth;
mod scopes;
mod session_token;
mod store;
mod token;

pub use associated_user::AssociatedUser;
pub use nonce::{NonceClaims, NonceCodec, NonceError};
pub use scopes::AuthScopes;
pub use session_token::{
    decode_session_token, decode_token_from_header, decode_token_from_header_at, SessionClaims,
    SessionTokenError,
};
pub use store::{StoreError, StoreFuture, TokenStore};
pub use token::{AccessTokenResponse, OfflineToken, OnlineToken, Token, TokenError};
