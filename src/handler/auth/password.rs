use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{ApiResult, ErrorResponse},
    handler::session::SESSION_COOKIE,
    service::auth::RegisterInput,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub account_uid: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub account_uid: Uuid,
    pub email: String,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .with_state(state)
}

fn session_cookie(config: &Config, value: String, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    if config.cookie_secure {
        cookie.set_secure(true);
    }
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.to_string());
    }
    cookie
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Created", body = RegisterResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let output = state
        .auth()
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
        })
        .await?;

    let response = RegisterResponse {
        account_uid: output.account.uid,
        email: output.account.email,
        full_name: output.profile.full_name,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Response> {
    let output = state
        .auth()
        .login(&payload.email, &payload.password)
        .await?;

    let config = state.config().values();
    let ttl = i64::try_from(config.session_ttl_seconds).unwrap_or(i64::MAX);
    let jar = CookieJar::new().add(session_cookie(config, output.session_id, ttl));
    let response = LoginResponse {
        account_uid: output.account.uid,
        email: output.account.email,
    };

    Ok((StatusCode::OK, jar, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 500, description = "Session delete failed", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> ApiResult<Response> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    state.auth().logout(cookie.value()).await?;

    let cleared = session_cookie(state.config().values(), String::new(), 0);
    let jar = jar.add(cleared);
    Ok((StatusCode::NO_CONTENT, jar).into_response())
}
