//! Shared helpers for route tests.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ekaty_core::{AppConfig, Environment};
use tower::ServiceExt;
use uuid::Uuid;

use super::{build_app, AppState};
use crate::middleware::{AuthState, RateLimitState};

pub(crate) const ADMIN_TOKEN: &str = "test-admin-token";

pub(crate) fn config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        seed_path: PathBuf::from("./config/restaurants.yaml"),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        spin_default_radius_miles: 5.0,
        rate_limit_per_minute: 1_000,
    }
}

/// App with admin auth enabled for [`ADMIN_TOKEN`] and a generous rate limit.
pub(crate) fn app(pool: sqlx::PgPool) -> Router {
    let auth = AuthState::from_keys(ADMIN_TOKEN, false).expect("auth");
    build_app(
        AppState {
            pool,
            config: Arc::new(config()),
        },
        auth,
        RateLimitState::per_minute(1_000),
    )
}

async fn call(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

pub(crate) async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    call(
        router,
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

pub(crate) async fn send_json(
    router: Router,
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    call(
        router,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
}

pub(crate) async fn send_admin(
    router: Router,
    method: Method,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    call(router, request).await
}

/// Insert an active restaurant at the Katy center point and return its id.
pub(crate) async fn seed_restaurant(
    pool: &sqlx::PgPool,
    name: &str,
    categories: &str,
    featured: bool,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO restaurants (slug, name, categories, latitude, longitude, price_level, featured) \
         VALUES ($1, $2, $3, 29.7858, -95.8244, 'MODERATE', $4) RETURNING id",
    )
    .bind(ekaty_core::slug_from_name(name))
    .bind(name)
    .bind(categories)
    .bind(featured)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("seed_restaurant failed for '{name}': {e}"))
}
