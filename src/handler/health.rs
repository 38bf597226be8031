use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Process is up", body = Health)
    ),
    tag = "health"
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Liveness only; no database or session store round-trip.
pub fn routes() -> Router {
    Router::new().route("/api/v1/health", get(health))
}
