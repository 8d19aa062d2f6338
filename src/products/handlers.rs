use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppResult,
    extract::{AppJson, AppPath, AppQuery},
    products::{
        dto::{NewProduct, ProductPatch, ProductQuery, ProductResponse, ReviewRequest},
        repo_types::Product,
        services,
    },
    state::AppState,
    users::dto::MessageResponse,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/review", post(add_review))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", post(create_product))
        .route("/admin/products/:id", put(update_product).delete(delete_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(services::list(&state.store, &query.q).await?))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> AppResult<Json<Product>> {
    Ok(Json(services::get(&state.store, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewProduct>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = services::create(&state.store, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product added".into(),
            product,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(payload): AppJson<ProductPatch>,
) -> AppResult<Json<ProductResponse>> {
    let product = services::update(&state.store, id, payload).await?;
    Ok(Json(ProductResponse {
        message: "Product updated".into(),
        product,
    }))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> AppResult<Json<MessageResponse>> {
    services::delete(&state.store, id).await?;
    Ok(Json(MessageResponse::new("Product deleted")))
}

#[instrument(skip(state, payload))]
pub async fn add_review(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(payload): AppJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    services::add_review(&state.store, id, payload).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Review added"))))
}
