//! Endpoint path normalization.

use crate::clients::rest::RestError;

/// Normalizes a REST endpoint to `resource/path.json[?query]`.
///
/// Leading slashes are stripped and a `.json` suffix is ensured. An inline
/// query string is kept after the suffix.
///
/// # Errors
///
/// Returns [`RestError::InvalidPath`] when nothing is left of the path.
pub fn normalize_path(endpoint: &str) -> Result<String, RestError> {
    let (path, query) = endpoint
        .split_once('?')
        .map_or((endpoint, None), |(path, query)| (path, Some(query)));

    let path = path.trim().trim_start_matches('/');
    let path = path.strip_suffix(".json").unwrap_or(path);
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        return Err(RestError::InvalidPath {
            path: endpoint.to_string(),
        });
    }

    Ok(match query.filter(|query| !query.is_empty()) {
        Some(query) => format!("{path}.json?{query}"),
        None => format!("{path}.json"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("orders").unwrap(), "orders.json");
        assert_eq!(normalize_path("/orders").unwrap(), "orders.json");
        assert_eq!(normalize_path("orders.json").unwrap(), "orders.json");
        assert_eq!(normalize_path("//orders/450789469.json").unwrap(), "orders/450789469.json");
        assert_eq!(normalize_path("orders/").unwrap(), "orders.json");
    }

    #[test]
    fn test_normalize_path_keeps_query() {
        assert_eq!(
            normalize_path("/orders.json?status=any&limit=5").unwrap(),
            "orders.json?status=any&limit=5"
        );
        assert_eq!(normalize_path("orders?").unwrap(), "orders.json");
    }

    #[test]
    fn test_empty_path_is_invalid() {
        for path in ["", "/", ".json", "/.json", "?limit=1"] {
            assert!(
                matches!(normalize_path(path), Err(RestError::InvalidPath { .. })),
                "{path:?}"
            );
        }
    }
}
