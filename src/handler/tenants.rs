use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{ApiResult, ErrorResponse},
    handler::{parse_enum_param, parse_uid_param, session::CurrentAccount},
    service::{
        fields::NumberInput,
        tenants::{ContactLinks, CreateTenantInput, TenantFilter, TenantView, UpdateTenantInput},
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateTenant {
    /// Property uid.
    pub property: Uuid,
    /// Unit uid; must be vacant.
    pub unit: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub annual_rent: NumberInput,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_due_day: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTenant {
    pub property: Option<Uuid>,
    pub unit: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub annual_rent: Option<NumberInput>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_due_day: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TenantQuery {
    pub q: Option<String>,
    pub payment_status: Option<String>,
    /// Property uid.
    pub property: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TenantResponse {
    pub uid: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub property_uid: Option<Uuid>,
    pub property_name: Option<String>,
    pub unit_uid: Option<Uuid>,
    pub unit_number: Option<String>,
    pub annual_rent: f64,
    pub monthly_rent: f64,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub lease_expiring_soon: bool,
    pub rent_due_day: Option<String>,
    pub payment_status: String,
    pub contact: ContactLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantView> for TenantResponse {
    fn from(view: TenantView) -> Self {
        let tenant = view.tenant;
        Self {
            uid: tenant.uid,
            name: tenant.name,
            email: tenant.email,
            phone: tenant.phone,
            property_uid: view.property_uid,
            property_name: view.property_name,
            unit_uid: view.unit_uid,
            unit_number: view.unit_number,
            annual_rent: tenant.annual_rent,
            monthly_rent: tenant.monthly_rent,
            lease_start: tenant.lease_start,
            lease_end: tenant.lease_end,
            lease_expiring_soon: view.lease_expiring_soon,
            rent_due_day: tenant.rent_due_day,
            payment_status: tenant.payment_status,
            contact: view.contact,
            created_at: tenant.created_at.with_timezone(&Utc),
            updated_at: tenant.updated_at.with_timezone(&Utc),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/tenants", get(list_tenants).post(create_tenant))
        .route(
            "/api/v1/tenants/:uid",
            get(get_tenant).patch(update_tenant).delete(delete_tenant),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    request_body = CreateTenant,
    responses(
        (status = 201, description = "Created and unit occupied", body = TenantResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Property or unit not found", body = ErrorResponse),
        (status = 409, description = "Unit already occupied", body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(payload): Json<CreateTenant>,
) -> ApiResult<(StatusCode, Json<TenantResponse>)> {
    let input = CreateTenantInput {
        property: payload.property,
        unit: payload.unit,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        annual_rent: payload.annual_rent,
        lease_start: payload.lease_start,
        lease_end: payload.lease_end,
        rent_due_day: payload.rent_due_day,
    };
    let view = state.tenants().create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    params(TenantQuery),
    responses(
        (status = 200, description = "Tenants", body = [TenantResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Json<Vec<TenantResponse>>> {
    let filter = TenantFilter {
        q: query.q,
        payment_status: parse_enum_param(query.payment_status.as_deref())?,
        property: parse_uid_param("property", query.property.as_deref())?,
    };
    let views = state.tenants().list(&ctx, filter).await?;
    Ok(Json(views.into_iter().map(TenantResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/tenants/{uid}",
    params(("uid" = Uuid, Path, description = "Tenant uid")),
    responses(
        (status = 200, description = "Tenant", body = TenantResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
) -> ApiResult<Json<TenantResponse>> {
    let view = state.tenants().get(&ctx, uid).await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tenants/{uid}",
    params(("uid" = Uuid, Path, description = "Tenant uid")),
    request_body = UpdateTenant,
    responses(
        (status = 200, description = "Updated", body = TenantResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Target unit occupied", body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
    Json(payload): Json<UpdateTenant>,
) -> ApiResult<Json<TenantResponse>> {
    let input = UpdateTenantInput {
        property: payload.property,
        unit: payload.unit,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        annual_rent: payload.annual_rent,
        lease_start: payload.lease_start,
        lease_end: payload.lease_end,
        rent_due_day: payload.rent_due_day,
        payment_status: payload.payment_status,
    };
    let view = state.tenants().update(&ctx, uid, input).await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tenants/{uid}",
    params(("uid" = Uuid, Path, description = "Tenant uid")),
    responses(
        (status = 204, description = "Deleted and unit released"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "tenants"
)]
pub async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tenants().delete(&ctx, uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
