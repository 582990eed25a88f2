// region:    --- Imports
use crate::auction::AuctionEngine;
use crate::listing::{ListingId, NewListing};
use crate::user::UserId;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
// endregion: --- Imports

/// Header carrying the acting user's id.
pub const USER_HEADER: &str = "x-user-id";

// region:    --- Request Bodies
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingsQuery {
    pub category: Option<String>,
}
// endregion: --- Request Bodies

// region:    --- Router
pub fn routes(engine: AuctionEngine) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/users", post(handle_register_user))
        .route("/users/:id", get(handle_get_user))
        .route("/listings", get(handle_get_listings).post(handle_create_listing))
        .route("/listings/:id", get(handle_get_listing))
        .route("/listings/:id/close", post(handle_close_listing))
        .route("/listings/:id/outcome", get(handle_get_outcome))
        .route(
            "/listings/:id/bids",
            get(handle_get_bids).post(handle_place_bid),
        )
        .route(
            "/listings/:id/comments",
            get(handle_get_comments).post(handle_add_comment),
        )
        .route("/listings/:id/watch", post(handle_toggle_watch))
        .route("/watchlist", get(handle_get_watchlist))
        .route("/categories", get(handle_get_categories))
        .layer(cors)
        .with_state(engine)
}
// endregion: --- Router

// region:    --- Actor
fn optional_actor(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn actor(headers: &HeaderMap) -> Result<UserId, Response> {
    optional_actor(headers).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": format!("missing or invalid {} header", USER_HEADER),
                "code": "UNAUTHORIZED"
            })),
        )
            .into_response()
    })
}
// endregion: --- Actor

// region:    --- Command Handlers
pub async fn handle_register_user(
    State(engine): State<AuctionEngine>,
    Json(req): Json<RegisterUserRequest>,
) -> Response {
    info!("{:<12} --> register user: {}", "Command", req.name);
    match engine.register_user(&req.name).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_create_listing(
    State(engine): State<AuctionEngine>,
    headers: HeaderMap,
    Json(req): Json<NewListing>,
) -> Response {
    let owner = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    info!("{:<12} --> create listing by user {}", "Command", owner);
    match engine.create_listing(owner, req).await {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_close_listing(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
    headers: HeaderMap,
) -> Response {
    let requester = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    info!("{:<12} --> close listing {} by user {}", "Command", id, requester);
    match engine.close_listing(id, requester).await {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_place_bid(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
    headers: HeaderMap,
    Json(req): Json<PlaceBidRequest>,
) -> Response {
    let bidder = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    info!(
        "{:<12} --> bid {} on listing {} by user {}",
        "Command", req.amount, id, bidder
    );
    match engine.place_bid(id, bidder, req.amount).await {
        Ok(bid) => (StatusCode::CREATED, Json(bid)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_add_comment(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
    headers: HeaderMap,
    Json(req): Json<CommentRequest>,
) -> Response {
    let author = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match engine.add_comment(id, author, &req.content).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_toggle_watch(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
    headers: HeaderMap,
) -> Response {
    let user = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match engine.toggle_watch(user, id).await {
        Ok(watching) => Json(serde_json::json!({ "watching": watching })).into_response(),
        Err(e) => e.into_response(),
    }
}
// endregion: --- Command Handlers

// region:    --- Query Handlers
pub async fn handle_get_user(
    State(engine): State<AuctionEngine>,
    Path(id): Path<UserId>,
) -> Response {
    match engine.get_user(id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Active and closed listings, optionally narrowed to one category.
pub async fn handle_get_listings(
    State(engine): State<AuctionEngine>,
    Query(query): Query<ListingsQuery>,
) -> Response {
    info!("{:<12} --> listings (category {:?})", "HandlerQuery", query.category);
    let category = query.category.filter(|c| !c.trim().is_empty());
    let listings = match category.as_deref() {
        Some(category) => engine.list_by_category(category).await,
        None => engine.list_listings().await,
    };
    match listings {
        Ok(listings) => {
            let (active, closed) = crate::listing::partition_listings(listings);
            Json(serde_json::json!({ "active": active, "closed": closed })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_listing(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
    headers: HeaderMap,
) -> Response {
    info!("{:<12} --> listing detail id: {}", "HandlerQuery", id);
    match engine.listing_detail(id, optional_actor(&headers)).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_outcome(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
) -> Response {
    match engine.determine_outcome(id).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_bids(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
) -> Response {
    match engine.list_bids(id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_comments(
    State(engine): State<AuctionEngine>,
    Path(id): Path<ListingId>,
) -> Response {
    match engine.list_comments(id).await {
        Ok(comments) => Json(comments).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_watchlist(
    State(engine): State<AuctionEngine>,
    headers: HeaderMap,
) -> Response {
    let user = match actor(&headers) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match engine.list_watched(user).await {
        Ok(listings) => Json(listings).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_categories(State(engine): State<AuctionEngine>) -> Response {
    match engine.categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => e.into_response(),
    }
}
// endregion: --- Query Handlers
