use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{cart, orders, products, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .merge(users::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "E-Commerce Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": ["/register", "/login"],
            "users": ["/user/<username>"],
            "products": ["/products", "/products/<id>", "/products?q=search", "/products/<id>/review"],
            "cart": ["/cart/<username>", "/cart/<username>/add", "/cart/<username>/remove", "/cart/<username>/update"],
            "orders": ["/checkout", "/orders/<username>", "/orders/<order_id>"],
            "admin": ["/admin/products", "/admin/products/<id>"]
        }
    }))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_and_index() {
        let app = build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let (status, body) = call(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "E-Commerce Backend API");
    }

    #[tokio::test]
    async fn shopping_flow_over_http() {
        let app = build_app(AppState::fake());

        let (status, _) = call(
            &app,
            Method::POST,
            "/register",
            Some(json!({
                "username": "alice", "password": "pw123456", "name": "Alice",
                "gender": "female", "birthday": "1990-01-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            &app,
            Method::POST,
            "/admin/products",
            Some(json!({"title": "Zenbook", "description": "14 inch", "price": 100.0, "brand": "Asus", "stock": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let product_id = body["product"]["id"].as_u64().unwrap();

        let (status, _) = call(
            &app,
            Method::POST,
            "/cart/alice/add",
            Some(json!({"product_id": product_id, "quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, cart) = call(&app, Method::GET, "/cart/alice", None).await;
        assert_eq!(cart["total"], 200.0);

        let (status, body) = call(&app, Method::POST, "/checkout", Some(json!({"username": "alice"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["order"]["total_price"], 200.0);
        let order_id = body["order"]["order_id"].as_u64().unwrap();

        let (_, product) = call(&app, Method::GET, &format!("/products/{product_id}"), None).await;
        assert_eq!(product["stock"], 3);
        assert_eq!(product["sold"], 2);

        let (status, order) = call(&app, Method::GET, &format!("/orders/{order_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["username"], "alice");

        let (_, orders) = call(&app, Method::GET, "/orders/alice", None).await;
        assert_eq!(orders.as_array().map(Vec::len), Some(1));

        let (_, profile) = call(&app, Method::GET, "/user/alice", None).await;
        assert_eq!(profile["orders"][0]["order_id"], order_id);
        assert!(profile.get("password").is_none());
    }

    #[tokio::test]
    async fn errors_are_json_with_reason() {
        let app = build_app(AppState::fake());

        let (status, body) = call(&app, Method::POST, "/checkout", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username required");

        let (status, body) = call(&app, Method::GET, "/products/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");

        let (status, body) = call(&app, Method::GET, "/orders/12", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");

        let (status, _) = call(
            &app,
            Method::POST,
            "/admin/products",
            Some(json!({"title": "No price", "description": "x", "brand": "y"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = build_app(AppState::fake());

        let (status, body) = call(
            &app,
            Method::POST,
            "/cart/alice/add",
            Some(json!({"quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|m| m.contains("product_id")));

        let (status, body) = call(&app, Method::GET, "/products/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/login")
                    .body(Body::from("username=alice"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }
}
