use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    entities::profiles,
    error::{ApiResult, ErrorResponse},
    handler::session::CurrentAccount,
    service::accounts::UpdateProfileInput,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<profiles::Model> for ProfileResponse {
    fn from(model: profiles::Model) -> Self {
        Self {
            full_name: model.full_name,
            phone: model.phone,
            company: model.company,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state.accounts().profile(&ctx).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Updated", body = ProfileResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "profile"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(payload): Json<UpdateProfile>,
) -> ApiResult<Json<ProfileResponse>> {
    let input = UpdateProfileInput {
        full_name: payload.full_name,
        phone: payload.phone,
        company: payload.company,
    };
    let profile = state.accounts().update_profile(&ctx, input).await?;
    Ok(Json(profile.into()))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/profile", get(get_profile).patch(update_profile))
        .with_state(state)
}
