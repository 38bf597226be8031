use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    entities::units,
    error::{ApiResult, ErrorResponse},
    handler::{parse_enum_param, session::CurrentAccount},
    service::{
        fields::NumberInput,
        properties::{CreatePropertyInput, PropertyFilter, PropertyView, UpdatePropertyInput},
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateProperty {
    pub name: String,
    pub address: String,
    pub property_type: String,
    /// Number of units (at most 500); a number or a numeric string.
    pub units: NumberInput,
    pub annual_rent_per_unit: NumberInput,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub address: Option<String>,
    pub property_type: Option<String>,
    pub units: Option<NumberInput>,
    pub annual_rent_per_unit: Option<NumberInput>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PropertyQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub property_type: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UnitResponse {
    pub uid: Uuid,
    pub unit_number: String,
    pub is_occupied: bool,
}

impl From<units::Model> for UnitResponse {
    fn from(unit: units::Model) -> Self {
        Self {
            uid: unit.uid,
            unit_number: unit.unit_number,
            is_occupied: unit.is_occupied,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PropertyResponse {
    pub uid: Uuid,
    pub name: String,
    pub address: String,
    pub property_type: String,
    pub units: i32,
    pub annual_rent_per_unit: f64,
    pub description: Option<String>,
    pub status: String,
    pub occupied_units: u32,
    pub occupancy_rate: u32,
    pub monthly_revenue: f64,
    pub unit_list: Vec<UnitResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyView> for PropertyResponse {
    fn from(view: PropertyView) -> Self {
        let property = view.property;
        Self {
            uid: property.uid,
            name: property.name,
            address: property.address,
            property_type: property.property_type,
            units: property.unit_count,
            annual_rent_per_unit: property.annual_rent_per_unit,
            description: property.description,
            status: property.status,
            occupied_units: view.occupied_units,
            occupancy_rate: view.occupancy_rate,
            monthly_revenue: view.monthly_revenue,
            unit_list: view.units.into_iter().map(UnitResponse::from).collect(),
            created_at: property.created_at.with_timezone(&Utc),
            updated_at: property.updated_at.with_timezone(&Utc),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/properties",
            get(list_properties).post(create_property),
        )
        .route(
            "/api/v1/properties/:uid",
            get(get_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/properties",
    request_body = CreateProperty,
    responses(
        (status = 201, description = "Created", body = PropertyResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Plan property limit reached", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(payload): Json<CreateProperty>,
) -> ApiResult<(StatusCode, Json<PropertyResponse>)> {
    let input = CreatePropertyInput {
        name: payload.name,
        address: payload.address,
        property_type: payload.property_type,
        units: payload.units,
        annual_rent_per_unit: payload.annual_rent_per_unit,
        description: payload.description,
        status: payload.status,
    };
    let view = state.properties().create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/properties",
    params(PropertyQuery),
    responses(
        (status = 200, description = "Properties", body = [PropertyResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Query(query): Query<PropertyQuery>,
) -> ApiResult<Json<Vec<PropertyResponse>>> {
    let filter = PropertyFilter {
        q: query.q,
        status: parse_enum_param(query.status.as_deref())?,
        property_type: parse_enum_param(query.property_type.as_deref())?,
    };
    let views = state.properties().list(&ctx, filter).await?;
    Ok(Json(views.into_iter().map(PropertyResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/properties/{uid}",
    params(("uid" = Uuid, Path, description = "Property uid")),
    responses(
        (status = 200, description = "Property", body = PropertyResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
) -> ApiResult<Json<PropertyResponse>> {
    let view = state.properties().get(&ctx, uid).await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/properties/{uid}",
    params(("uid" = Uuid, Path, description = "Property uid")),
    request_body = UpdateProperty,
    responses(
        (status = 200, description = "Updated", body = PropertyResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Unit count below occupied units", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn update_property(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
    Json(payload): Json<UpdateProperty>,
) -> ApiResult<Json<PropertyResponse>> {
    let input = UpdatePropertyInput {
        name: payload.name,
        address: payload.address,
        property_type: payload.property_type,
        units: payload.units,
        annual_rent_per_unit: payload.annual_rent_per_unit,
        description: payload.description,
        status: payload.status,
    };
    let view = state.properties().update(&ctx, uid, input).await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/properties/{uid}",
    params(("uid" = Uuid, Path, description = "Property uid")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Property still has tenants", body = ErrorResponse)
    ),
    tag = "properties"
)]
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.properties().delete(&ctx, uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
