use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppResult,
    extract::{AppJson, AppPath},
    state::AppState,
    users::{
        dto::{
            LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UpdateUserRequest,
            UserProfile,
        },
        services,
    },
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user/:username", get(get_user).put(update_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    services::register(&state.store, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = services::login(&state.store, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        username: user.username,
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(services::profile(&state.store, &username).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::update(&state.store, &username, payload).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}
