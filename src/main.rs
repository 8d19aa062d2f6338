mod app;
mod cart;
mod config;
mod dates;
mod db;
mod error;
mod extract;
mod orders;
mod products;
mod state;
mod storage;
mod users;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "shopfront=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(data_dir = %app_state.config.data_dir.display(), "record store ready");

    if let Some(seed) = app_state.config.seed_products_file.clone() {
        if let Err(e) = products::services::import_seed(&app_state.store, &seed).await {
            tracing::warn!(error = %format!("{e:#}"), seed = %seed.display(), "seed import failed; continuing");
        }
    }

    let config = app_state.config.clone();
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}
