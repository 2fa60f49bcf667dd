//! Route configuration and setup.
//!
//! Lead routes live in [leads](lead_routes); health checks in [health](health).

mod health;

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::middleware::{
    rate_limit::{rate_limit_middleware, HttpRateLimiter},
    request_id_middleware,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use lumiq_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let rate_limiter = setup_rate_limiter(config);

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = lead_routes(state.clone())
        .merge(public_routes(state.clone()))
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn setup_rate_limiter(config: &Config) -> Arc<HttpRateLimiter> {
    let shard_count = std::env::var("RATE_LIMITER_SHARD_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(16)
        .max(1);

    let rate_limiter = Arc::new(HttpRateLimiter::with_shards(
        config.http_rate_limit_per_minute,
        shard_count,
    ));

    let rate_limiter_for_cleanup = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter_for_cleanup.cleanup_expired_buckets().await;
        }
    });

    tracing::info!(
        rate_limit_per_minute = config.http_rate_limit_per_minute,
        shard_count = shard_count,
        "HTTP rate limiting enabled with sharded buckets and automatic cleanup (every 5 minutes)"
    );
    rate_limiter
}

fn lead_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            &format!("{}/leads/contact", API_PREFIX),
            post(handlers::leads::submit_contact),
        )
        .route(
            &format!("{}/leads/pilot", API_PREFIX),
            post(handlers::leads::submit_pilot),
        )
        .route(
            &format!("{}/leads/status/{{client_ref}}", API_PREFIX),
            get(handlers::leads::get_submission_status),
        )
        .with_state(state)
}

fn public_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || {
                    let state = state.clone();
                    async { health::health_check(state).await }
                }
            }),
        )
        .route(
            "/live",
            get({
                let state = state.clone();
                move || async { health::liveness_check(state).await }
            }),
        )
        .route(
            "/ready",
            get({
                let state = state.clone();
                move || async { health::readiness_check(state).await }
            }),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}
