use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    cart::{
        dto::{CartItemRequest, CartView, RemoveItemRequest},
        services,
    },
    error::AppResult,
    extract::{AppJson, AppPath},
    state::AppState,
    users::dto::MessageResponse,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/:username", get(get_cart))
        .route("/cart/:username/add", post(add_to_cart))
        .route("/cart/:username/remove", post(remove_from_cart))
        .route("/cart/:username/update", put(update_cart))
}

#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<CartView>> {
    Ok(Json(services::view(&state.store, &username).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(payload): AppJson<CartItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::add(&state.store, &username, payload.product_id, payload.quantity).await?;
    Ok(Json(MessageResponse::new("Item added to cart")))
}

#[instrument(skip(state, payload))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(payload): AppJson<RemoveItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::remove(&state.store, &username, payload.product_id).await?;
    Ok(Json(MessageResponse::new("Item removed from cart")))
}

#[instrument(skip(state, payload))]
pub async fn update_cart(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(payload): AppJson<CartItemRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::update(&state.store, &username, payload.product_id, payload.quantity).await?;
    Ok(Json(MessageResponse::new("Cart updated")))
}
