use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ErrorResponse, ServiceError},
    handler::accounts::ProfileResponse,
    model::AccountContext,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "sid";

/// The signed-in account, resolved from the `sid` session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub AccountContext);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Err(ApiError::unauthorized("missing session"));
        };

        let session = state
            .sessions()
            .get(cookie.value())
            .await
            .map_err(ServiceError::from)?;

        match session {
            Some(session) => Ok(Self(session.context())),
            None => {
                debug!("session cookie did not match a live session");
                Err(ApiError::unauthorized("invalid session"))
            }
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub account_uid: Uuid,
    pub email: String,
    pub profile: ProfileResponse,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/me", get(me))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
) -> ApiResult<Json<MeResponse>> {
    let (account, profile) = state.accounts().me(&ctx).await?;
    Ok(Json(MeResponse {
        account_uid: account.uid,
        email: account.email,
        profile: profile.into(),
    }))
}
