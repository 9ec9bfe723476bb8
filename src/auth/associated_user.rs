//! The staff member an online token belongs to.

use serde::{Deserialize, Serialize};

/// User details returned by the token endpoint for online (per-user) grants.
///
/// Only `id` is guaranteed; the profile fields default to empty values when
/// the platform omits them.
///
/// ```rust
/// use shopify_app::AssociatedUser;
///
/// let user: AssociatedUser = serde_json::from_str(r#"{"id": 902541635}"#).unwrap();
/// assert_eq!(user.id, 902_541_635);
/// assert!(user.email.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// Platform user id.
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    /// Whether the user owns the store.
    #[serde(default)]
    pub account_owner: bool,
    #[serde(default)]
    pub locale: String,
    /// Whether the user is a collaborator account rather than staff.
    #[serde(default)]
    pub collaborator: bool,
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
};
