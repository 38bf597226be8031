use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    entities::payments,
    error::{ApiResult, ErrorResponse},
    handler::{parse_enum_param, session::CurrentAccount},
    service::payments::{PaymentFilter, PaymentSummary},
    state::AppState,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentResponse {
    pub uid: Uuid,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub amount: f64,
    pub paid_on: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
    pub payment_type: String,
    pub status: String,
}

impl From<payments::Model> for PaymentResponse {
    fn from(payment: payments::Model) -> Self {
        Self {
            uid: payment.uid,
            tenant_name: payment.tenant_name,
            unit_label: payment.unit_label,
            amount: payment.amount,
            paid_on: payment.paid_on,
            method: payment.method,
            reference: payment.reference,
            payment_type: payment.payment_type,
            status: payment.status,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
    pub summary: PaymentSummary,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/payments", get(list_payments))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PaymentQuery),
    responses(
        (status = 200, description = "Filtered payments and totals", body = PaymentListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Query(query): Query<PaymentQuery>,
) -> ApiResult<Json<PaymentListResponse>> {
    let filter = PaymentFilter {
        q: query.q,
        status: parse_enum_param(query.status.as_deref())?,
        method: query.method,
    };
    let list = state.payments().list(&ctx, filter).await?;
    Ok(Json(PaymentListResponse {
        payments: list.payments.into_iter().map(PaymentResponse::from).collect(),
        summary: list.summary,
    }))
}
