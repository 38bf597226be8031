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
    handler::{parse_enum_param, session::CurrentAccount},
    model::BillStatus,
    service::{
        bills::{BillFilter, BillView, CreateBillInput, UpdateBillInput},
        fields::NumberInput,
    },
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct CreateBill {
    /// Tenant uid; either this or `tenant_name` is required.
    pub tenant: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub bill_type: String,
    pub amount: NumberInput,
    /// Defaults to today.
    pub issue_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    /// Defaults to `draft`.
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateBill {
    pub tenant: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub bill_type: Option<String>,
    pub amount: Option<NumberInput>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BillQuery {
    pub q: Option<String>,
    /// Matched against the displayed status, so `overdue` includes past-due bills.
    pub status: Option<String>,
    pub bill_type: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BillResponse {
    pub uid: Uuid,
    pub tenant_uid: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub bill_type: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub display_status: BillStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BillView> for BillResponse {
    fn from(view: BillView) -> Self {
        let bill = view.bill;
        Self {
            uid: bill.uid,
            tenant_uid: view.tenant_uid,
            tenant_name: bill.tenant_name,
            unit_label: bill.unit_label,
            bill_type: bill.bill_type,
            amount: bill.amount,
            issue_date: bill.issue_date,
            due_date: bill.due_date,
            status: bill.status,
            display_status: view.display_status,
            description: bill.description,
            created_at: bill.created_at.with_timezone(&Utc),
            updated_at: bill.updated_at.with_timezone(&Utc),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/bills", get(list_bills).post(create_bill))
        .route("/api/v1/bills/:uid", get(get_bill).patch(update_bill))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/bills",
    request_body = CreateBill,
    responses(
        (status = 201, description = "Created", body = BillResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Tenant not found", body = ErrorResponse)
    ),
    tag = "bills"
)]
pub async fn create_bill(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(payload): Json<CreateBill>,
) -> ApiResult<(StatusCode, Json<BillResponse>)> {
    let input = CreateBillInput {
        tenant: payload.tenant,
        tenant_name: payload.tenant_name,
        unit_label: payload.unit_label,
        bill_type: payload.bill_type,
        amount: payload.amount,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        status: payload.status,
        description: payload.description,
    };
    let view = state.bills().create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bills",
    params(BillQuery),
    responses(
        (status = 200, description = "Bills", body = [BillResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "bills"
)]
pub async fn list_bills(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Query(query): Query<BillQuery>,
) -> ApiResult<Json<Vec<BillResponse>>> {
    let filter = BillFilter {
        q: query.q,
        status: parse_enum_param(query.status.as_deref())?,
        bill_type: parse_enum_param(query.bill_type.as_deref())?,
    };
    let views = state.bills().list(&ctx, filter).await?;
    Ok(Json(views.into_iter().map(BillResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/bills/{uid}",
    params(("uid" = Uuid, Path, description = "Bill uid")),
    responses(
        (status = 200, description = "Bill", body = BillResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "bills"
)]
pub async fn get_bill(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
) -> ApiResult<Json<BillResponse>> {
    let view = state.bills().get(&ctx, uid).await?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bills/{uid}",
    params(("uid" = Uuid, Path, description = "Bill uid")),
    request_body = UpdateBill,
    responses(
        (status = 200, description = "Updated", body = BillResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "bills"
)]
pub async fn update_bill(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
    Json(payload): Json<UpdateBill>,
) -> ApiResult<Json<BillResponse>> {
    let input = UpdateBillInput {
        tenant: payload.tenant,
        tenant_name: payload.tenant_name,
        unit_label: payload.unit_label,
        bill_type: payload.bill_type,
        amount: payload.amount,
        issue_date: payload.issue_date,
        due_date: payload.due_date,
        status: payload.status,
        description: payload.description,
    };
    let view = state.bills().update(&ctx, uid, input).await?;
    Ok(Json(view.into()))
}
