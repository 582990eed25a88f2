use auction_marketplace::handlers::{routes, USER_HEADER};
use auction_marketplace::store::MemoryStore;
use auction_marketplace::AuctionEngine;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Boots the router on an ephemeral port and returns its base URL.
async fn spawn_app() -> String {
    let engine = AuctionEngine::new(Arc::new(MemoryStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes(engine).into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

async fn register(client: &Client, base: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/users", base))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_listing(client: &Client, base: &str, owner: i64, price: i64) -> i64 {
    let response = client
        .post(format!("{}/listings", base))
        .header(USER_HEADER, owner.to_string())
        .json(&json!({
            "title": "Typewriter",
            "description": "Works, ribbon included",
            "starting_price": price,
            "category": "office"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn bid(
    client: &Client,
    base: &str,
    listing: i64,
    bidder: i64,
    amount: i64,
) -> reqwest::Response {
    client
        .post(format!("{}/listings/{}/bids", base, listing))
        .header(USER_HEADER, bidder.to_string())
        .json(&json!({ "amount": amount }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_auction_lifecycle_over_http() {
    let base = spawn_app().await;
    let client = Client::new();

    let seller = register(&client, &base, "seller").await;
    let buyer = register(&client, &base, "buyer").await;
    let listing = create_listing(&client, &base, seller, 100).await;

    let low = bid(&client, &base, listing, buyer, 100).await;
    assert_eq!(low.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = low.json().await.unwrap();
    assert_eq!(body["code"], "LOW_BID");

    let ok = bid(&client, &base, listing, buyer, 150).await;
    assert_eq!(ok.status(), StatusCode::CREATED);

    let forbidden = client
        .post(format!("{}/listings/{}/close", base, listing))
        .header(USER_HEADER, buyer.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let closed = client
        .post(format!("{}/listings/{}/close", base, listing))
        .header(USER_HEADER, seller.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(closed.status(), StatusCode::OK);

    let again = client
        .post(format!("{}/listings/{}/close", base, listing))
        .header(USER_HEADER, seller.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let late = bid(&client, &base, listing, buyer, 500).await;
    assert_eq!(late.status(), StatusCode::CONFLICT);
    let body: Value = late.json().await.unwrap();
    assert_eq!(body["code"], "LISTING_CLOSED");

    let outcome: Value = client
        .get(format!("{}/listings/{}/outcome", base, listing))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["active"], false);
    assert_eq!(outcome["winner"], buyer);
    assert_eq!(outcome["current_price"], 150);
}

#[tokio::test]
async fn test_watchlist_and_detail_over_http() {
    let base = spawn_app().await;
    let client = Client::new();

    let seller = register(&client, &base, "seller").await;
    let watcher = register(&client, &base, "watcher").await;
    let listing = create_listing(&client, &base, seller, 20).await;

    let toggled: Value = client
        .post(format!("{}/listings/{}/watch", base, listing))
        .header(USER_HEADER, watcher.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["watching"], true);

    let watchlist: Value = client
        .get(format!("{}/watchlist", base))
        .header(USER_HEADER, watcher.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(watchlist.as_array().unwrap().len(), 1);

    let detail: Value = client
        .get(format!("{}/listings/{}", base, listing))
        .header(USER_HEADER, watcher.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["watching"], true);
    assert_eq!(detail["is_owner"], false);
    assert_eq!(detail["minimum_bid"], 20);
    assert!(detail["outcome"]["winner"].is_null());

    let listings: Value = client
        .get(format!("{}/listings?category=office", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listings["active"].as_array().unwrap().len(), 1);
    assert!(listings["closed"].as_array().unwrap().is_empty());

    let unfiltered: Value = client
        .get(format!("{}/listings?category=", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unfiltered["active"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejections_map_to_status_codes() {
    let base = spawn_app().await;
    let client = Client::new();
    let seller = register(&client, &base, "seller").await;

    let missing_actor = client
        .post(format!("{}/listings", base))
        .json(&json!({ "title": "x", "description": "y", "starting_price": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_actor.status(), StatusCode::UNAUTHORIZED);

    let too_expensive = client
        .post(format!("{}/listings", base))
        .header(USER_HEADER, seller.to_string())
        .json(&json!({ "title": "x", "description": "y", "starting_price": 10000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_expensive.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let unknown = client
        .get(format!("{}/listings/999", base))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let duplicate = client
        .post(format!("{}/users", base))
        .json(&json!({ "name": "seller" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
