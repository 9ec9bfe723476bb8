//! Token persistence contract.
//!
//! The crate never stores tokens itself. Hosts implement [`TokenStore`] on
//! whatever backend they use (database, key-value store, encrypted file) and
//! hand it to completion hooks or business logic. Implementations must be
//! safe to call concurrently for different stores.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::auth::{OfflineToken, OnlineToken, Token};
use crate::config::ShopDomain;

/// Boxed future returned by [`TokenStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Host-implemented persistence for [`Token`]s.
///
/// `save` replaces any previous token with the same identity: the store
/// domain for offline tokens, the store domain plus user id for online ones.
pub trait TokenStore: Send + Sync {
    /// Persists or replaces a token.
    fn save<'a>(&'a self, token: &'a Token) -> StoreFuture<'a, ()>;

    /// Fetches the current offline token for a store.
    fn load_offline<'a>(&'a self, store_domain: &'a ShopDomain) -> StoreFuture<'a, OfflineToken>;

    /// Fetches the online token for a store and user.
    fn load_online<'a>(
        &'a self,
        store_domain: &'a ShopDomain,
        user_id: u64,
    ) -> StoreFuture<'a, OnlineToken>;
}

/// Errors reported by [`TokenStore`] implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No token is stored under the requested identity.
    #[error("No token stored for {store_domain}{}", .user_id.map(|id| format!(" (user {id})")).unwrap_or_default())]
    TokenNotFound {
        /// Store the lookup was for.
        store_domain: ShopDomain,
        /// User the lookup was for, for online tokens.
        user_id: Option<u64>,
    },

    /// The backend failed.
    #[error("Token store backend failure: {message}")]
    Backend {
        /// Human-readable failure detail.
        message: String,
    },
}

impl StoreError {
    /// Shorthand for an offline-token miss.
    #[must_use]
    pub fn offline_not_found(store_domain: &ShopDomain) -> Self {
        Self::TokenNotFound {
            store_domain: store_domain.clone(),
            user_id: None,
        }
    }

    /// Shorthand for an online-token miss.
    #[must_use]
    pub fn online_not_found(store_domain: &ShopDomain, user_id: u64) -> Self {
        Self::TokenNotFound {
            store_domain: store_domain.clone(),
            user_id: Some(user_id),
        }
    }

    /// HTTP status a host should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TokenNotFound { .. } => 404,
            Self::Backend { .. } => 500,
        }
    }
}
