//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Gateway endpoints, without middleware
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/config", get(handlers::get_config))
        .route("/files/{region}/{bucket}", get(handlers::list_files))
        .route("/upload", post(handlers::upload_file))
        .route("/raw/{region}/{bucket}/{filename}", get(handlers::raw_file))
        .route(
            "/download/{region}/{bucket}/{filename}",
            get(handlers::download_file),
        )
        .route("/health", get(handlers::health_check).head(handlers::health_check))
}

/// Create the main router
///
/// Every endpoint is served both at the root and under `/api`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(state.config.max_upload_size));

    if let Some(limiter) = middleware::create_rate_limiter(state.config.rate_limit_rps) {
        middleware::spawn_rate_limiter_pruning(&limiter, middleware::RATE_LIMIT_PRUNE_INTERVAL);
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router = router
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any);
        router = router.layer(cors);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
