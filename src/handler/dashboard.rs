use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::{
    error::{ApiResult, ErrorResponse},
    handler::session::CurrentAccount,
    service::dashboard::DashboardSummary,
    state::AppState,
};

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/dashboard", get(summary))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Portfolio totals", body = DashboardSummary),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.dashboard().summary(&ctx).await?))
}
