use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    orders::{
        dto::{CheckoutRequest, CheckoutResponse},
        services,
    },
    state::AppState,
};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders/:key", get(get_orders))
}

#[instrument(skip(state, payload))]
pub async fn checkout(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    let username = payload
        .username
        .ok_or_else(|| AppError::invalid("Username required"))?;
    let order = services::checkout(&state.store, &username).await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Order placed successfully".into(),
            order,
        }),
    ))
}

/// `/orders/<digits>` is a single order by id; anything else is a username.
#[instrument(skip(state))]
pub async fn get_orders(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Response> {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        let order_id = key
            .parse::<u64>()
            .map_err(|_| AppError::not_found("Order not found"))?;
        let order = services::by_id(&state.store, order_id).await?;
        return Ok(Json(order).into_response());
    }
    let orders = services::for_user(&state.store, &key).await?;
    Ok(Json(orders).into_response())
}
