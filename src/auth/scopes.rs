//! OAuth scope sets.
//!
//! [`AuthScopes`] keeps scopes exactly as requested or granted. A `write_*`
//! scope implies the matching `read_*` scope, but that implication is only
//! applied when checking coverage, never by rewriting the set: the platform's
//! granted scope string is authoritative.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// An ordered set of OAuth scopes.
///
/// Displays and serializes as a comma-joined string, the format the
/// authorization URL and the token endpoint both use.
///
/// ```rust
/// use shopify_app::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products".parse().unwrap();
/// assert_eq!(scopes.to_string(), "read_products,write_orders");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no scopes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of distinct scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is present verbatim.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Iterates scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn validate(scope: &str) -> Result<(), ConfigError> {
        if scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(())
        } else {
            Err(ConfigError::InvalidScopes {
                reason: format!("Invalid characters in scope: '{scope}'"),
            })
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();
        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            Self::validate(scope)?;
            scopes.insert(scope.to_string());
        }
        Ok(Self { scopes })
    }
}

impl<S: AsRef<str>> FromIterator<S> for AuthScopes {
    /// Collects scopes, dropping blanks. Does not validate characters; use
    /// [`str::parse`] for untrusted input.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            scopes: iter
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
