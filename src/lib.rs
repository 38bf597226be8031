use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handler;
pub mod model;
pub mod openapi;
pub mod repo;
pub mod schema;
pub mod service;
pub mod state;

use crate::{openapi::ApiDoc, state::AppState};

/// The full HTTP surface: every feature router plus the API docs.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(handler::health::routes())
        .merge(handler::auth::password::routes(state.clone()))
        .merge(handler::session::routes(state.clone()))
        .merge(handler::accounts::routes(state.clone()))
        .merge(handler::subscription::routes(state.clone()))
        .merge(handler::properties::routes(state.clone()))
        .merge(handler::vacancies::routes(state.clone()))
        .merge(handler::tenants::routes(state.clone()))
        .merge(handler::bills::routes(state.clone()))
        .merge(handler::payments::routes(state.clone()))
        .merge(handler::dashboard::routes(state))
        .layer(TraceLayer::new_for_http())
}
