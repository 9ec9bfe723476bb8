//! Store credentials.
//!
//! A [`Token`] is either an [`OfflineToken`] (one per store, never expires)
//! or an [`OnlineToken`] (one per store and staff member, expires). Tokens are
//! immutable: a renewed credential is a new value produced by a new OAuth
//! exchange.
//!
//! Persistence goes through the host-implemented
//! [`TokenStore`](crate::auth::TokenStore); the `save`/`load` helpers here are
//! thin wrappers over it.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{OfflineToken, ShopDomain, Token};
//!
//! let token = Token::Offline(OfflineToken::new(
//!     ShopDomain::new("my-store").unwrap(),
//!     "shpat_123",
//!     "write_orders".parse().unwrap(),
//! ));
//!
//! assert_eq!(token.store_domain().as_ref(), "my-store.myshopify.com");
//! assert!(!token.is_online());
//! assert!(!format!("{token:?}").contains("shpat_123"));
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::store::{StoreError, TokenStore};
use crate::auth::{AssociatedUser, AuthScopes};
use crate::config::ShopDomain;
use crate::error::ConfigError;

// Upper bound on a reported lifetime, keeps expiry arithmetic in range.
const MAX_LIFETIME_SECS: i64 = 100 * 365 * 86_400;

/// Body of a successful authorization-code exchange.
#[derive(Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Comma-joined granted scopes.
    pub scope: String,
    /// Seconds until an online token expires.
    pub expires_in: Option<u64>,
    pub associated_user_scope: Option<String>,
    pub associated_user: Option<AssociatedUser>,
}

impl fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("associated_user_scope", &self.associated_user_scope)
            .field("associated_user", &self.associated_user)
            .finish()
    }
}

/// A token response could not be turned into a [`Token`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// A field required for the requested token kind is absent.
    #[error("Token response is missing '{field}'")]
    MissingField {
        /// The absent field.
        field: &'static str,
    },

    /// The response's access token is empty.
    #[error("Token response carries an empty access token")]
    EmptyAccessToken,

    /// A scope string could not be parsed.
    #[error(transparent)]
    InvalidScope(#[from] ConfigError),
}

/// Store-level credential that does not expire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineToken {
    store_domain: ShopDomain,
    access_token: String,
    scope: AuthScopes,
}

impl OfflineToken {
    /// Creates an offline token, e.g. when rehydrating a persisted record.
    #[must_use]
    pub fn new(store_domain: ShopDomain, access_token: impl Into<String>, scope: AuthScopes) -> Self {
        Self {
            store_domain,
            access_token: access_token.into(),
            scope,
        }
    }

    /// Builds an offline token from a token-endpoint response.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the access token is empty or the scope
    /// string is malformed.
    pub fn from_response(
        store_domain: ShopDomain,
        response: &AccessTokenResponse,
    ) -> Result<Self, TokenError> {
        if response.access_token.is_empty() {
            return Err(TokenError::EmptyAccessToken);
        }
        Ok(Self::new(
            store_domain,
            response.access_token.clone(),
            response.scope.parse()?,
        ))
    }

    #[must_use]
    pub const fn store_domain(&self) -> &ShopDomain {
        &self.store_domain
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub const fn scope(&self) -> &AuthScopes {
        &self.scope
    }

    /// Loads the current offline token for `store_domain`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TokenNotFound`] when none is stored, or whatever
    /// backend error the store reports.
    pub async fn load<S>(store: &S, store_domain: &ShopDomain) -> Result<Self, StoreError>
    where
        S: TokenStore + ?Sized,
    {
        store.load_offline(store_domain).await
    }
}

impl fmt::Debug for OfflineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineToken")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Per-user credential with an expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineToken {
    store_domain: ShopDomain,
    access_token: String,
    scope: AuthScopes,
    expires_in: u64,
    expires_at: DateTime<Utc>,
    associated_user_id: u64,
    associated_user: Option<AssociatedUser>,
    associated_user_scope: AuthScopes,
}

impl OnlineToken {
    /// Creates an online token expiring `expires_in` seconds after `issued_at`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store_domain: ShopDomain,
        access_token: impl Into<String>,
        scope: AuthScopes,
        expires_in: u64,
        issued_at: DateTime<Utc>,
        associated_user_id: u64,
        associated_user: Option<AssociatedUser>,
        associated_user_scope: AuthScopes,
    ) -> Self {
        let lifetime = Duration::seconds(
            i64::try_from(expires_in).map_or(MAX_LIFETIME_SECS, |secs| secs.min(MAX_LIFETIME_SECS)),
        );
        Self {
            store_domain,
            access_token: access_token.into(),
            scope,
            expires_in,
            expires_at: issued_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            associated_user_id,
            associated_user,
            associated_user_scope,
        }
    }

    /// Builds an online token from a token-endpoint response received at
    /// `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingField`] when `expires_in` or
    /// `associated_user` is absent, plus the offline-token failure cases.
    pub fn from_response(
        store_domain: ShopDomain,
        response: &AccessTokenResponse,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        if response.access_token.is_empty() {
            return Err(TokenError::EmptyAccessToken);
        }
        let expires_in = response
            .expires_in
            .ok_or(TokenError::MissingField { field: "expires_in" })?;
        let user = response
            .associated_user
            .clone()
            .ok_or(TokenError::MissingField {
                field: "associated_user",
            })?;
        let user_scope = match &response.associated_user_scope {
            Some(scope) => scope.parse()?,
            None => AuthScopes::new(),
        };

        Ok(Self::new(
            store_domain,
            response.access_token.clone(),
            response.scope.parse()?,
            expires_in,
            issued_at,
            user.id,
            Some(user),
            user_scope,
        ))
    }

    #[must_use]
    pub const fn store_domain(&self) -> &ShopDomain {
        &self.store_domain
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub const fn scope(&self) -> &AuthScopes {
        &self.scope
    }

    /// Lifetime in seconds as reported at issue time.
    #[must_use]
    pub const fn expires_in(&self) -> u64 {
        self.expires_in
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub const fn associated_user_id(&self) -> u64 {
        self.associated_user_id
    }

    #[must_use]
    pub const fn associated_user(&self) -> Option<&AssociatedUser> {
        self.associated_user.as_ref()
    }

    /// The subset of [`scope`](Self::scope) granted to this user.
    #[must_use]
    pub const fn associated_user_scope(&self) -> &AuthScopes {
        &self.associated_user_scope
    }

    /// Returns `true` once `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Loads the online token for `store_domain` and `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TokenNotFound`] when none is stored, or whatever
    /// backend error the store reports.
    pub async fn load<S>(
        store: &S,
        store_domain: &ShopDomain,
        user_id: u64,
    ) -> Result<Self, StoreError>
    where
        S: TokenStore + ?Sized,
    {
        store.load_online(store_domain, user_id).await
    }
}

impl fmt::Debug for OnlineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnlineToken")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .field("associated_user_id", &self.associated_user_id)
            .field("associated_user_scope", &self.associated_user_scope)
            .finish_non_exhaustive()
    }
}

/// A store credential of either kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Offline(OfflineToken),
    Online(OnlineToken),
}

impl Token {
    #[must_use]
    pub const fn store_domain(&self) -> &ShopDomain {
        match self {
            Self::Offline(token) => token.store_domain(),
            Self::Online(token) => token.store_domain(),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        match self {
            Self::Offline(token) => token.access_token(),
            Self::Online(token) => token.access_token(),
        }
    }

    #[must_use]
    pub const fn scope(&self) -> &AuthScopes {
        match self {
            Self::Offline(token) => token.scope(),
            Self::Online(token) => token.scope(),
        }
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Online(_))
    }

    /// Online tokens expire; offline tokens never do.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Offline(_) => false,
            Self::Online(token) => token.is_expired_at(now),
        }
    }

    /// Persists this token through `store`.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`StoreError`].
    pub async fn save<S>(&self, store: &S) -> Result<(), StoreError>
    where
        S: TokenStore + ?Sized,
    {
        store.save(self).await
    }
}

impl From<OfflineToken> for Token {
    fn from(token: OfflineToken) -> Self {
        Self::Offline(token)
    }
}

impl From<OnlineToken> for Token {
    fn from(token: OnlineToken) -> Self {
        Self::Online(token)
    }
}

// Verify Token is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Token>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn store() -> ShopDomain {
        ShopDomain::new("test-store").unwrap()
    }

    fn online_response() -> AccessTokenResponse {
        serde_json::from_value(json!({
            "access_token": "online-token",
            "scope": "write_orders,read_customers",
            "expires_in": 86_399,
            "associated_user_scope": "write_orders",
            "associated_user": {
                "id": 902_541_635,
                "first_name": "John",
                "last_name": "Smith",
                "email": "john@example.com",
                "email_verified": true,
                "account_owner": true,
                "locale": "en",
                "collaborator": false
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_offline_from_response_keeps_granted_scope() {
        let response: AccessTokenResponse = serde_json::from_value(json!({
            "access_token": "offline-token",
            "scope": "write_orders"
        }))
        .unwrap();

        let token = OfflineToken::from_response(store(), &response).unwrap();
        assert_eq!(token.access_token(), "offline-token");
        assert_eq!(token.scope().to_string(), "write_orders");
    }

    #[test]
    fn test_online_from_response_derives_expiry_and_user() {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = OnlineToken::from_response(store(), &online_response(), issued_at).unwrap();

        assert_eq!(token.associated_user_id(), 902_541_635);
        assert_eq!(token.expires_in(), 86_399);
        assert_eq!(token.expires_at(), issued_at + Duration::seconds(86_399));
        assert_eq!(token.associated_user_scope().to_string(), "write_orders");
        assert_eq!(
            token.associated_user().map(|u| u.email.as_str()),
            Some("john@example.com")
        );
    }

    #[test]
    fn test_online_from_response_requires_user() {
        let response: AccessTokenResponse = serde_json::from_value(json!({
            "access_token": "online-token",
            "scope": "write_orders",
            "expires_in": 60
        }))
        .unwrap();

        let result = OnlineToken::from_response(store(), &response, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            TokenError::MissingField {
                field: "associated_user"
            }
        );
    }

    #[test]
    fn test_empty_access_token_is_rejected() {
        let response: AccessTokenResponse = serde_json::from_value(json!({
            "access_token": "",
            "scope": "write_orders"
        }))
        .unwrap();

        assert_eq!(
            OfflineToken::from_response(store(), &response).unwrap_err(),
            TokenError::EmptyAccessToken
        );
    }

    #[test]
    fn test_online_expiry_boundaries() {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = Token::Online(
            OnlineToken::from_response(store(), &online_response(), issued_at).unwrap(),
        );

        assert!(!token.is_expired_at(issued_at + Duration::seconds(86_398)));
        assert!(token.is_expired_at(issued_at + Duration::seconds(86_399)));
    }

    #[test]
    fn test_offline_never_expires() {
        let token = Token::from(OfflineToken::new(store(), "t", AuthScopes::new()));
        assert!(!token.is_expired_at(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_token_serde_is_tagged_by_kind() {
        let token = Token::from(OfflineToken::new(store(), "t", "read_orders".parse().unwrap()));
        let value = serde_json::to_value(&token).unwrap();

        assert_eq!(value["kind"], "offline");
        assert_eq!(value["store_domain"], "test-store.myshopify.com");
        assert_eq!(value["scope"], "read_orders");

        let restored: Token = serde_json::from_value(value).unwrap();
        assert_eq!(restored, token);
    }

    #[test]
    fn test_debug_masks_access_tokens() {
        let issued_at = Utc::now();
        let online = OnlineToken::from_response(store(), &online_response(), issued_at).unwrap();
        let response_debug = format!("{:?}", online_response());

        assert!(!format!("{online:?}").contains("online-token"));
        assert!(!response_debug.contains("online-token"));
    }
}
