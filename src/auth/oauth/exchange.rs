//! Authorization-code exchange.
//!
//! A single unauthenticated POST to `{store}/admin/oauth/access_token`. It
//! runs before any token exists, so it bypasses the rate-limited client and
//! is never retried.

use serde::Serialize;

use crate::auth::oauth::OAuthError;
use crate::auth::AccessTokenResponse;
use crate::config::{ShopDomain, ShopifyConfig};

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Trades `code` for an access token.
///
/// # Errors
///
/// Returns [`OAuthError::TokenExchangeFailed`] on transport failures, non-2xx
/// responses and bodies that are not a token response.
pub async fn exchange_authorization_code(
    http: &reqwest::Client,
    config: &ShopifyConfig,
    store: &ShopDomain,
    code: &str,
) -> Result<AccessTokenResponse, OAuthError> {
    let token_url = format!("{}/admin/oauth/access_token", config.store_base_uri(store));

    let request_body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let response = http
        .post(&token_url)
        .json(&request_body)
        .send()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status: 0,
            message: format!("Network error: {e}"),
        })?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(OAuthError::TokenExchangeFailed {
            status,
            message: error_body,
        });
    }

    response
        .json::<AccessTokenResponse>()
        .await
        .map_err(|e| OAuthError::TokenExchangeFailed {
            status,
            message: format!("Failed to parse token response: {e}"),
        })
}
