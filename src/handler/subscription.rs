use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::subscription_plans,
    error::{ApiResult, ErrorResponse},
    handler::session::CurrentAccount,
    service::subscription::{GateSnapshot, RemainingProperties},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    pub uid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// `-1` means unlimited.
    pub property_limit: i32,
    #[schema(value_type = Object)]
    pub features: serde_json::Value,
}

impl From<subscription_plans::Model> for PlanResponse {
    fn from(plan: subscription_plans::Model) -> Self {
        Self {
            uid: plan.uid,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            property_limit: plan.property_limit,
            features: plan.features,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub plan: Option<PlanResponse>,
    pub started_at: Option<DateTime<Utc>>,
    pub property_count: u64,
    pub property_limit: Option<i32>,
    /// `null` when the plan has no limit.
    pub remaining_properties: Option<u64>,
    pub unbounded: bool,
    pub can_add_property: bool,
    pub is_free_plan: bool,
    pub is_premium: bool,
}

impl From<GateSnapshot> for SubscriptionResponse {
    fn from(snapshot: GateSnapshot) -> Self {
        let gate = snapshot.gate;
        let (remaining_properties, unbounded) = match gate.remaining_properties() {
            RemainingProperties::Unbounded => (None, true),
            RemainingProperties::Slots(slots) => (Some(slots), false),
        };
        let (started_at, plan) = match snapshot.subscription {
            Some((subscription, plan)) => (
                Some(subscription.started_at.with_timezone(&Utc)),
                Some(PlanResponse::from(plan)),
            ),
            None => (None, None),
        };

        Self {
            property_limit: plan.as_ref().map(|plan| plan.property_limit),
            plan,
            started_at,
            property_count: gate.property_count(),
            remaining_properties,
            unbounded,
            can_add_property: gate.can_add_property(),
            is_free_plan: gate.is_free_plan(),
            is_premium: gate.is_premium(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePlan {
    pub plan: String,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/plans", get(list_plans))
        .route(
            "/api/v1/subscription",
            get(get_subscription).put(change_plan),
        )
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/plans",
    responses(
        (status = 200, description = "Available plans", body = [PlanResponse])
    ),
    tag = "subscription"
)]
pub async fn list_plans(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PlanResponse>>> {
    let plans = state.subscriptions().list_plans().await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscription",
    responses(
        (status = 200, description = "Active plan and property quota", body = SubscriptionResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "subscription"
)]
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
) -> ApiResult<Json<SubscriptionResponse>> {
    let snapshot = state.subscriptions().snapshot(&ctx).await;
    Ok(Json(snapshot.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/subscription",
    request_body = ChangePlan,
    responses(
        (status = 200, description = "Plan changed", body = SubscriptionResponse),
        (status = 404, description = "Unknown plan", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "subscription"
)]
pub async fn change_plan(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Json(payload): Json<ChangePlan>,
) -> ApiResult<Json<SubscriptionResponse>> {
    state.subscriptions().change_plan(&ctx, &payload.plan).await?;
    let snapshot = state.subscriptions().snapshot(&ctx).await;
    Ok(Json(snapshot.into()))
}
