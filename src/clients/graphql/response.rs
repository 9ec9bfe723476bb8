//! GraphQL response bodies and the cost extension.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::clients::graphql::GraphqlError;

const THROTTLED: &str = "THROTTLED";
const MAX_COST_EXCEEDED: &str = "MAX_COST_EXCEEDED";
const INVALID_TOKEN_MESSAGE: &str = "Invalid API key or access token";

/// `extensions.cost.throttleStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    pub maximum_available: f64,
    pub currently_available: f64,
    /// Points restored per second.
    pub restore_rate: f64,
}

impl ThrottleStatus {
    /// How long until `requested` points are available, in whole seconds.
    ///
    /// `None` if the restore rate is not positive.
    #[must_use]
    pub fn wait_for(&self, requested: f64) -> Option<Duration> {
        if self.restore_rate.is_nan() || self.restore_rate <= 0.0 {
            return None;
        }
        let missing = requested - self.currently_available;
        if missing <= 0.0 {
            return Some(Duration::ZERO);
        }
        Duration::try_from_secs_f64((missing / self.restore_rate).ceil()).ok()
    }
}

/// `extensions.cost`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCost {
    pub requested_query_cost: f64,
    /// Absent when the query did not run.
    #[serde(default)]
    pub actual_query_cost: Option<f64>,
    pub throttle_status: ThrottleStatus,
}

/// A GraphQL response that was not a fatal failure.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphqlResponse {
    pub data: Option<Value>,
    /// GraphQL errors, returned to the caller as-is.
    pub errors: Vec<Value>,
    pub extensions: Option<Value>,
    /// The parsed cost extension, when present and well-formed.
    pub cost: Option<QueryCost>,
}

impl GraphqlResponse {
    /// Classifies a response body.
    ///
    /// # Errors
    ///
    /// - [`GraphqlError::InvalidAccessToken`] for the platform's
    ///   invalid-token message
    /// - [`GraphqlError::MaxCostExceeded`] for a `MAX_COST_EXCEEDED` error
    /// - [`GraphqlError::InvalidResponseBody`] if the body is not an object
    pub fn from_body(body: Value) -> Result<Self, GraphqlError> {
        let Value::Object(mut object) = body else {
            return Err(GraphqlError::InvalidResponseBody {
                reason: "expected a JSON object".to_string(),
            });
        };
        if object.contains_key("raw_body") && !object.contains_key("data") {
            return Err(GraphqlError::InvalidResponseBody {
                reason: "body is not JSON".to_string(),
            });
        }

        let extensions = object.remove("extensions");
        let cost = extensions
            .as_ref()
            .and_then(|extensions| extensions.get("cost"))
            .and_then(|cost| QueryCost::deserialize(cost).ok());
        let data = object.remove("data").filter(|data| !data.is_null());

        let errors = match object.remove("errors") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(message)) => {
                if message.contains(INVALID_TOKEN_MESSAGE) {
                    tracing::warn!("The Shopify API rejected the access token as invalid");
                    return Err(GraphqlError::InvalidAccessToken);
                }
                vec![Value::String(message)]
            }
            Some(Value::Array(errors)) => errors,
            Some(other) => vec![other],
        };

        if let Some(error) = errors
            .iter()
            .find(|error| error_code(error) == Some(MAX_COST_EXCEEDED))
        {
            return Err(GraphqlError::MaxCostExceeded {
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(MAX_COST_EXCEEDED)
                    .to_string(),
            });
        }

        Ok(Self {
            data,
            errors,
            extensions,
            cost,
        })
    }

    /// `extensions.code` of every error that has one.
    pub fn error_codes(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().filter_map(error_code)
    }

    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.error_codes().any(|code| code == THROTTLED)
    }

    /// Wait before retrying a throttled query, from the cost extension.
    #[must_use]
    pub fn throttle_delay(&self) -> Option<Duration> {
        self.cost
            .as_ref()
            .and_then(|cost| cost.throttle_status.wait_for(cost.requested_query_cost))
    }
}

fn error_code(error: &Value) -> Option<&str> {
    error.get("extensions")?.get("code")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cost(requested: u32, available: u32, rate: u32) -> Value {
        json!({
            "cost": {
                "requestedQueryCost": requested,
                "actualQueryCost": null,
                "throttleStatus": {
                    "maximumAvailable": 1000,
                    "currentlyAvailable": available,
                    "restoreRate": rate
                }
            }
        })
    }

    #[test]
    fn test_throttled_response_waits_for_missing_points() {
        let response = GraphqlResponse::from_body(json!({
            "extensions": cost(100, 0, 50),
            "errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}]
        }))
        .unwrap();

        assert!(response.is_throttled());
        assert_eq!(response.throttle_delay(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_wait_rounds_up_to_whole_seconds() {
        let status = ThrottleStatus {
            maximum_available: 1000.0,
            currently_available: 800.0,
            restore_rate: 50.0,
        };
        assert_eq!(status.wait_for(992.0), Some(Duration::from_secs(4)));
        assert_eq!(status.wait_for(500.0), Some(Duration::ZERO));
    }

    #[test]
    fn test_zero_restore_rate_has_no_wait() {
        let status = ThrottleStatus {
            maximum_available: 1000.0,
            currently_available: 0.0,
            restore_rate: 0.0,
        };
        assert_eq!(status.wait_for(10.0), None);
    }

    #[test]
    fn test_successful_response() {
        let response = GraphqlResponse::from_body(json!({
            "data": {"shop": {"name": "Test"}},
            "extensions": cost(1, 999, 50)
        }))
        .unwrap();

        assert_eq!(response.data, Some(json!({"shop": {"name": "Test"}})));
        assert!(response.errors.is_empty());
        assert!(!response.is_throttled());
        assert_eq!(response.cost.unwrap().requested_query_cost, 1.0);
    }

    #[test]
    fn test_malformed_cost_is_ignored() {
        let response = GraphqlResponse::from_body(json!({
            "data": {},
            "extensions": {"cost": {"requestedQueryCost": "lots"}}
        }))
        .unwrap();

        assert!(response.cost.is_none());
        assert!(response.extensions.is_some());
    }

    #[test]
    fn test_max_cost_exceeded_is_fatal() {
        let result = GraphqlResponse::from_body(json!({
            "errors": [{
                "message": "Query cost is 1032, which exceeds the single query max cost limit (1000).",
                "extensions": {"code": "MAX_COST_EXCEEDED", "cost": 1032, "maxCost": 1000}
            }]
        }));

        match result {
            Err(GraphqlError::MaxCostExceeded { message }) => assert!(message.contains("1032")),
            other => panic!("Expected MaxCostExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_token_string() {
        let result = GraphqlResponse::from_body(json!({
            "errors": "[API] Invalid API key or access token (unrecognized login or wrong password)"
        }));
        assert!(matches!(result, Err(GraphqlError::InvalidAccessToken)));
    }

    #[test]
    fn test_other_errors_are_returned() {
        let response = GraphqlResponse::from_body(json!({
            "data": null,
            "errors": [{"message": "Field 'nope' doesn't exist on type 'QueryRoot'"}]
        }))
        .unwrap();

        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.error_codes().count(), 0);
    }

    #[test]
    fn test_non_object_body_is_invalid() {
        assert!(matches!(
            GraphqlResponse::from_body(json!([1, 2])),
            Err(GraphqlError::InvalidResponseBody { .. })
        ));
        assert!(matches!(
            GraphqlResponse::from_body(json!({"raw_body": "<html>"})),
            Err(GraphqlError::InvalidResponseBody { .. })
        ));
    }
}
