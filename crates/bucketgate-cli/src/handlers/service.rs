//! Service-level handlers (region layout, health)

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Region layout exposed to clients
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub regions: Vec<&'a str>,
    pub buckets: BTreeMap<&'a str, &'a [String]>,
}

/// GET /config - Regions and their permitted buckets
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.gateway.registry();
    Json(ConfigResponse {
        regions: registry.regions().collect(),
        buckets: registry.bucket_map(),
    })
    .into_response()
}

/// GET|HEAD /health - Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
