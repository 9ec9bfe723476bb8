//! Integration tests for host-implemented token persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use shopify_app::auth::StoreFuture;
use shopify_app::{
    AssociatedUser, OfflineToken, OnlineToken, ShopDomain, StoreError, Token, TokenStore,
};

/// A store that keeps tokens serialized, the way a database-backed one would.
#[derive(Default)]
struct JsonStore {
    rows: Mutex<HashMap<String, String>>,
}

fn offline_key(store_domain: &ShopDomain) -> String {
    format!("offline:{store_domain}")
}

fn online_key(store_domain: &ShopDomain, user_id: u64) -> String {
    format!("online:{store_domain}:{user_id}")
}

fn backend(error: &serde_json::Error) -> StoreError {
    StoreError::Backend {
        message: error.to_string(),
    }
}

impl TokenStore for JsonStore {
    fn save<'a>(&'a self, token: &'a Token) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let key = match token {
                Token::Offline(t) => offline_key(t.store_domain()),
                Token::Online(t) => online_key(t.store_domain(), t.associated_user_id()),
            };
            let row = serde_json::to_string(token).map_err(|e| backend(&e))?;
            self.rows.lock().unwrap().insert(key, row);
            Ok(())
        })
    }

    fn load_offline<'a>(&'a self, store_domain: &'a ShopDomain) -> StoreFuture<'a, OfflineToken> {
        Box::pin(async move {
            let row = self
                .rows
                .lock()
                .unwrap()
                .get(&offline_key(store_domain))
                .cloned()
                .ok_or_else(|| StoreError::offline_not_found(store_domain))?;
            match serde_json::from_str(&row).map_err(|e| backend(&e))? {
                Token::Offline(token) => Ok(token),
                Token::Online(_) => Err(StoreError::offline_not_found(store_domain)),
            }
        })
    }

    fn load_online<'a>(
        &'a self,
        store_domain: &'a ShopDomain,
        user_id: u64,
    ) -> StoreFuture<'a, OnlineToken> {
        Box::pin(async move {
            let row = self
                .rows
                .lock()
                .unwrap()
                .get(&online_key(store_domain, user_id))
                .cloned()
                .ok_or_else(|| StoreError::online_not_found(store_domain, user_id))?;
            match serde_json::from_str(&row).map_err(|e| backend(&e))? {
                Token::Online(token) => Ok(token),
                Token::Offline(_) => Err(StoreError::online_not_found(store_domain, user_id)),
            }
        })
    }
}

fn shop() -> ShopDomain {
    ShopDomain::new("test-store").unwrap()
}

fn online_token(access_token: &str) -> OnlineToken {
    OnlineToken::new(
        shop(),
        access_token,
        "read_orders".parse().unwrap(),
        86399,
        Utc::now(),
        902_541_635,
        Some(AssociatedUser {
            id: 902_541_635,
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "john@example.com".to_string(),
            email_verified: true,
            account_owner: true,
            locale: "en".to_string(),
            collaborator: false,
        }),
        "read_orders".parse().unwrap(),
    )
}

#[tokio::test]
async fn test_offline_and_online_tokens_are_stored_separately() {
    let store = JsonStore::default();
    let offline = OfflineToken::new(shop(), "shpat_offline", "write_orders".parse().unwrap());
    let online = online_token("shpua_online");

    Token::from(offline.clone()).save(&store).await.unwrap();
    Token::from(online.clone()).save(&store).await.unwrap();

    assert_eq!(OfflineToken::load(&store, &shop()).await.unwrap(), offline);
    assert_eq!(
        OnlineToken::load(&store, &shop(), 902_541_635).await.unwrap(),
        online
    );
}

#[tokio::test]
async fn test_save_replaces_previous_token() {
    let store = JsonStore::default();

    Token::from(online_token("first")).save(&store).await.unwrap();
    Token::from(online_token("second")).save(&store).await.unwrap();

    let loaded = OnlineToken::load(&store, &shop(), 902_541_635).await.unwrap();
    assert_eq!(loaded.access_token(), "second");
    assert_eq!(store.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let store = JsonStore::default();
    Token::from(online_token("shpua_online")).save(&store).await.unwrap();

    let error = OnlineToken::load(&store, &shop(), 1).await.unwrap_err();

    assert_eq!(error, StoreError::online_not_found(&shop(), 1));
    assert_eq!(error.status_code(), 404);
}
