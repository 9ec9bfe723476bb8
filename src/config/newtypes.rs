//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper checks its contents on construction, so the rest of the crate
//! can treat a `ShopDomain` or `HostUrl` as already well-formed.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The app's public Shopify API key (the OAuth `client_id`).
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The app's Shopify API secret (the OAuth `client_secret`).
///
/// `Debug` output is masked as `ApiSecretKey(*****)` so the secret never
/// reaches logs.
///
/// ```rust
/// use shopify_app::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// Key material used to sign OAuth nonces.
///
/// Kept separate from the API secret so the two can rotate independently.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPrivateKey`] if no bytes are supplied.
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyPrivateKey);
        }
        Ok(Self(key))
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&ApiSecretKey> for PrivateKey {
    fn from(secret: &ApiSecretKey) -> Self {
        Self(secret.as_ref().as_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(*****)")
    }
}

/// A validated store domain, the tenant identifier for every call.
///
/// # Accepted Formats
///
/// - `shop-name` is normalized to `shop-name.myshopify.com`
/// - `shop-name.myshopify.com` is used as-is
/// - any other dotted hostname (`shop.example.com`) is kept verbatim, which
///   covers custom domains and development proxies
///
/// Input is trimmed and lowercased. Serializes to the full domain string.
///
/// ```rust
/// use shopify_app::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
///
/// let custom = ShopDomain::new("Shop.Example.com").unwrap();
/// assert_eq!(custom.as_ref(), "shop.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShopDomain(String);

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated store domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if any label is empty,
    /// contains characters other than `a-z`, `0-9` and `-`, or starts or ends
    /// with a hyphen.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        let full_domain = if domain.contains('.') {
            domain
        } else {
            format!("{domain}{}", Self::SUFFIX)
        };

        if full_domain.split('.').all(Self::is_valid_label) {
            Ok(Self(full_domain))
        } else {
            Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            })
        }
    }

    fn is_valid_label(label: &str) -> bool {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated absolute URL (scheme, host, optional port and path).
///
/// Used for the app's public URL and for the `api_host` override.
///
/// ```rust
/// use shopify_app::HostUrl;
///
/// let url = HostUrl::new("http://127.0.0.1:8080/app").unwrap();
/// assert_eq!(url.origin(), "http://127.0.0.1:8080");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    url: String,
    authority_end: usize,
}

impl HostUrl {
    /// Creates a new validated host URL. A trailing `/` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the scheme or host is missing.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidHostUrl { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let authority_end = remainder
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        let host_end = url[host_start..authority_end]
            .find(':')
            .map_or(authority_end, |i| host_start + i);

        if host_end == host_start {
            return Err(invalid());
        }

        Ok(Self {
            url,
            authority_end,
        })
    }

    /// Returns `scheme://host[:port]` with any path removed.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.url[..self.authority_end]
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_blank_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_secrets_are_masked_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        assert_eq!(format!("{secret:?}"), "ApiSecretKey(*****)");

        let key = PrivateKey::new(b"signing-material".to_vec()).unwrap();
        let debug_output = format!("{key:?}");
        assert_eq!(debug_output, "PrivateKey(*****)");
        assert!(!debug_output.contains("signing"));
    }

    #[test]
    fn test_private_key_rejects_empty_bytes() {
        assert!(matches!(
            PrivateKey::new(Vec::new()),
            Err(ConfigError::EmptyPrivateKey)
        ));
    }

    #[test]
    fn test_private_key_from_secret_copies_bytes() {
        let secret = ApiSecretKey::new("hush").unwrap();
        let key = PrivateKey::from(&secret);
        assert_eq!(key.as_bytes(), b"hush");
    }

    #[test]
    fn test_shop_domain_normalizes_short_format() {
        let domain = ShopDomain::new("my-store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_accepts_custom_hostnames() {
        let domain = ShopDomain::new("shop.example.com").unwrap();
        assert_eq!(domain.as_ref(), "shop.example.com");
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new("my store").is_err());
        assert!(ShopDomain::new("my_store").is_err());
        assert!(ShopDomain::new("-my-store").is_err());
        assert!(ShopDomain::new("my-store-").is_err());
        assert!(ShopDomain::new("shop..example.com").is_err());
        assert!(ShopDomain::new("shop.example.com.").is_err());
        assert!(ShopDomain::new("https://shop.example.com").is_err());
    }

    #[test]
    fn test_shop_domain_is_case_insensitive() {
        let domain = ShopDomain::new("  MY-STORE ").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_serde_uses_full_domain() {
        let domain = ShopDomain::new("my-store").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""my-store.myshopify.com""#);

        let restored: ShopDomain = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, domain);

        let bad: Result<ShopDomain, _> = serde_json::from_str(r#""not valid""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_host_url_parts() {
        let url = HostUrl::new("https://myapp.example.com/").unwrap();
        assert_eq!(url.as_ref(), "https://myapp.example.com");
        assert_eq!(url.origin(), "https://myapp.example.com");

        let url = HostUrl::new("http://localhost:3000/shopify").unwrap();
        assert_eq!(url.origin(), "http://localhost:3000");
        assert_eq!(url.as_ref(), "http://localhost:3000/shopify");
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("myapp.example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("://example.com").is_err());
        assert!(HostUrl::new("https://:8080").is_err());
    }
}
