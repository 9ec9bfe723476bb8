//! Admin GraphQL API support.
//!
//! Queries go through [`RateLimitedClient::execute_gql`](crate::clients::RateLimitedClient::execute_gql)
//! as a POST to `/admin/api/{version}/graphql.json`. The platform meters
//! GraphQL by query cost and reports the bucket in the `extensions.cost`
//! object of every response; a `THROTTLED` error is waited out for as long as
//! the bucket needs to restore the missing points, then retried.

mod errors;
mod response;

pub use errors::GraphqlError;
pub use response::{GraphqlResponse, QueryCost, ThrottleStatus};
