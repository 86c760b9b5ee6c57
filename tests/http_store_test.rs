use httpmock::prelude::*;
use httpmock::Method::PATCH;
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use storefront::adapters::{HttpStore, StaticIdentity};
use storefront::domain::model::{CatalogQuery, ItemDraft, ItemId, UserId};
use storefront::domain::ports::{CatalogAdmin, CatalogSource, InventoryService, PurchaseHistory};
use storefront::{InventoryError, LineRejection, Services, StoreError, StorefrontSession};

fn store_for(server: &MockServer) -> HttpStore {
    HttpStore::new(&server.base_url(), Some("anon-key".to_string()), Duration::from_secs(5))
        .unwrap()
        .with_access_token("user-token")
}

fn sweets() -> serde_json::Value {
    json!([
        {"id": "s1", "name": "Almond Brittle", "category": "Hard Candy", "price": 3.0, "quantity": 5,
         "description": null, "image_url": null},
        {"id": "s2", "name": "Butter Cookie", "category": "Cookies", "price": 2.5, "quantity": 2,
         "description": "crisp", "image_url": null},
        {"id": "s3", "name": "Cocoa Fudge", "category": "Chocolate", "price": 4.0, "quantity": 9,
         "description": null, "image_url": "https://img.example.com/fudge.png"}
    ])
}

#[tokio::test]
async fn test_purchase_posts_rpc_with_credentials() {
    let server = MockServer::start_async().await;
    let rpc_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/purchase_sweet")
                .header("apikey", "anon-key")
                .header("Authorization", "Bearer user-token")
                .json_body(json!({"sweet_id": "s1", "purchase_quantity": 2}));
            then.status(204);
        })
        .await;

    let store = store_for(&server);
    store.purchase(&ItemId::new("s1"), 2).await.unwrap();

    rpc_mock.assert_async().await;
}

#[tokio::test]
async fn test_purchase_rejection_maps_to_insufficient_stock() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/purchase_sweet");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(json!({"code": "P0001", "message": "Insufficient stock available"}));
        })
        .await;

    let err = store_for(&server)
        .purchase(&ItemId::new("s2"), 9)
        .await
        .unwrap_err();

    assert_eq!(err, InventoryError::InsufficientStock(ItemId::new("s2")));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/restock_sweet");
            then.status(503).body("maintenance");
        })
        .await;

    let err = store_for(&server)
        .restock(&ItemId::new("s1"), 5)
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Transient(message) if message.contains("maintenance")));
}

#[tokio::test]
async fn test_list_items_sends_filters() {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/sweets")
                .query_param("select", "*")
                .query_param("order", "name.asc")
                .query_param("name", "ilike.*fudge*")
                .query_param("category", "eq.Chocolate");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([sweets()[2].clone()]));
        })
        .await;

    let query = CatalogQuery::all()
        .with_search("fudge")
        .with_category("Chocolate");
    let items = store_for(&server).list_items(&query).await.unwrap();

    list_mock.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price, dec!(4.0));
    assert_eq!(items[0].available_quantity, 9);
    assert_eq!(
        items[0].image_url.as_deref(),
        Some("https://img.example.com/fudge.png")
    );
}

#[tokio::test]
async fn test_search_text_wildcards_are_escaped() {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/sweets")
                .query_param("name", "ilike.*50\\% cocoa\\_bar*");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([]));
        })
        .await;

    let query = CatalogQuery::all().with_search("50% cocoa_bar");
    let items = store_for(&server).list_items(&query).await.unwrap();

    list_mock.assert_async().await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_purchase_history_parses_joined_rows() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/purchases")
                .query_param("user_id", "eq.u-42")
                .query_param("order", "created_at.desc");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([
                    {"id": "p2", "quantity": 2, "total_price": 8.0,
                     "created_at": "2025-03-02T09:30:00+00:00",
                     "sweet": {"id": "s3", "name": "Cocoa Fudge", "image_url": null, "category": "Chocolate"}},
                    {"id": "p1", "quantity": 1, "total_price": 3.0,
                     "created_at": "2025-03-01T18:00:00+00:00",
                     "sweet": null}
                ]));
        })
        .await;

    let records = store_for(&server)
        .purchases_for(&UserId("u-42".to_string()))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].total_price, dec!(8));
    assert_eq!(records[0].item.as_ref().unwrap().category, "Chocolate");
    assert!(records[1].item.is_none());
}

#[tokio::test]
async fn test_http_checkout_stops_at_first_rejected_line() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/sweets");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(sweets());
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/purchase_sweet")
                .json_body(json!({"sweet_id": "s1", "purchase_quantity": 1}));
            then.status(204);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/purchase_sweet")
                .json_body(json!({"sweet_id": "s2", "purchase_quantity": 2}));
            then.status(400)
                .json_body(json!({"message": "Insufficient stock available"}));
        })
        .await;
    let third = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/purchase_sweet")
                .json_body(json!({"sweet_id": "s3", "purchase_quantity": 1}));
            then.status(204);
        })
        .await;

    let services = Services::http(
        store_for(&server),
        StaticIdentity::signed_in(UserId("u-42".to_string())),
    );
    let mut session = StorefrontSession::new(services, Some(Duration::from_secs(5)));
    assert!(session.add_to_cart(&ItemId::new("s1"), 1).await.unwrap());
    assert!(session.add_to_cart(&ItemId::new("s2"), 2).await.unwrap());
    assert!(session.add_to_cart(&ItemId::new("s3"), 1).await.unwrap());

    let err = session.checkout().await.unwrap_err();
    let failure = err.partial_failure().unwrap();

    assert_eq!(failure.failed_index, 1);
    assert_eq!(failure.committed_count, 1);
    assert_eq!(
        failure.reason,
        LineRejection::InsufficientStock(ItemId::new("s2"))
    );
    assert_eq!(
        err.to_string(),
        "failed to purchase Butter Cookie: insufficient stock for item s2"
    );

    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;
    third.assert_hits_async(0).await;
    assert_eq!(session.cart().len(), 3);
}

#[tokio::test]
async fn test_insert_item_posts_draft_and_returns_row() {
    let server = MockServer::start_async().await;
    let insert_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/sweets")
                .header("Prefer", "return=representation")
                .json_body(json!([{
                    "name": "Kaju Katli",
                    "category": "Candy",
                    "price": 120.0,
                    "quantity": 8
                }]));
            then.status(201)
                .header("Content-Type", "application/json")
                .json_body(json!([{
                    "id": "0b6f", "name": "Kaju Katli", "category": "Candy", "price": 120.0,
                    "quantity": 8, "description": null, "image_url": null,
                    "created_at": "2025-03-01T10:00:00+00:00",
                    "updated_at": "2025-03-01T10:00:00+00:00"
                }]));
        })
        .await;

    let draft = ItemDraft::new("Kaju Katli", "Candy", dec!(120), 8);
    let item = store_for(&server).insert_item(&draft).await.unwrap();

    insert_mock.assert_async().await;
    assert_eq!(item.id, ItemId::new("0b6f"));
    assert_eq!(item.available_quantity, 8);
}

#[tokio::test]
async fn test_update_and_delete_target_one_row() {
    let server = MockServer::start_async().await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/sweets")
                .query_param("id", "eq.s1")
                .json_body(json!({
                    "name": "Almond Brittle",
                    "category": "Hard Candy",
                    "price": 3.5,
                    "quantity": 5
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([{
                    "id": "s1", "name": "Almond Brittle", "category": "Hard Candy",
                    "price": 3.5, "quantity": 5, "description": null, "image_url": null
                }]));
        })
        .await;
    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/sweets")
                .query_param("id", "eq.s1");
            then.status(204);
        })
        .await;

    let store = store_for(&server);
    let draft = ItemDraft::new("Almond Brittle", "Hard Candy", dec!(3.5), 5);
    let item = store.update_item(&ItemId::new("s1"), &draft).await.unwrap();
    assert_eq!(item.price, dec!(3.5));
    store.delete_item(&ItemId::new("s1")).await.unwrap();

    update_mock.assert_async().await;
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn test_update_matching_no_row_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/rest/v1/sweets");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([]));
        })
        .await;

    let err = store_for(&server)
        .update_item(&ItemId::new("gone"), &ItemDraft::new("X", "Candy", dec!(1), 1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::InventoryError(InventoryError::NotFound(_))
    ));
}
