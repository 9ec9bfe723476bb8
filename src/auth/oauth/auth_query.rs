//! Callback query parameters.

use serde::Deserialize;

/// Query parameters the platform sends to the OAuth callback.
///
/// Deserializes straight from a query string with any serde-based extractor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthQuery {
    /// Authorization code to exchange.
    pub code: String,
    /// Store domain.
    pub shop: String,
    /// The nonce issued by the install step.
    pub state: String,
    pub timestamp: String,
    /// Base64 admin host, sent for embedded apps.
    #[serde(default)]
    pub host: Option<String>,
    /// Hex HMAC-SHA256 over the other parameters.
    #[serde(default)]
    pub hmac: String,
}

impl AuthQuery {
    /// Creates an unsigned query. `host` and `hmac` start empty.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        shop: impl Into<String>,
        state: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            shop: shop.into(),
            state: state.into(),
            timestamp: timestamp.into(),
            host: None,
            hmac: String::new(),
        }
    }

    /// Sets the `host` parameter.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// The message the platform signs: every parameter except `hmac`, sorted
    /// by name, as `key=value` pairs joined with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let mut params = vec![
            ("code", self.code.as_str()),
            ("shop", self.shop.as_str()),
            ("state", self.state.as_str()),
            ("timestamp", self.timestamp.as_str()),
        ];
        if let Some(host) = &self.host {
            params.push(("host", host.as_str()));
        }
        params.sort_unstable_by_key(|(key, _)| *key);

        params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signable_string_is_sorted_and_skips_hmac() {
        let mut query = AuthQuery::new("abc", "shop.example.com", "nonce", "1700000000")
            .with_host("YWRtaW4=");
        query.hmac = "ignored".to_string();

        assert_eq!(
            query.to_signable_string(),
            "code=abc&host=YWRtaW4=&shop=shop.example.com&state=nonce&timestamp=1700000000"
        );
    }

    #[test]
    fn test_deserializes_without_optional_fields() {
        let query: AuthQuery = serde_json::from_value(serde_json::json!({
            "code": "abc",
            "shop": "shop.example.com",
            "state": "nonce",
            "timestamp": "1"
        }))
        .unwrap();

        assert!(query.host.is_none());
        assert!(query.hmac.is_empty());
    }
}
