use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::Stream;
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{ApiResult, ErrorResponse},
    handler::{parse_uid_param, session::CurrentAccount},
    service::vacancy::{watch_property, PropertyVacancies, VacancyWatch},
    state::AppState,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VacancyQuery {
    /// Tenant whose current unit stays selectable.
    pub editing_tenant: Option<String>,
}

impl VacancyQuery {
    fn editing_tenant(&self) -> ApiResult<Option<Uuid>> {
        parse_uid_param("editing_tenant", self.editing_tenant.as_deref())
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/vacancies", get(account_vacancies))
        .route("/api/v1/properties/:uid/vacancies", get(property_vacancies))
        .route(
            "/api/v1/properties/:uid/vacancies/stream",
            get(stream_vacancies),
        )
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/properties/{uid}/vacancies",
    params(("uid" = Uuid, Path, description = "Property uid"), VacancyQuery),
    responses(
        (status = 200, description = "Selectable units", body = PropertyVacancies),
        (status = 404, description = "Property or tenant not found", body = ErrorResponse)
    ),
    tag = "vacancies"
)]
pub async fn property_vacancies(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
    Query(query): Query<VacancyQuery>,
) -> ApiResult<Json<PropertyVacancies>> {
    let editing_tenant = query.editing_tenant()?;
    let vacancies = state
        .vacancies()
        .for_property(&ctx, uid, editing_tenant)
        .await?;
    Ok(Json(vacancies))
}

#[utoipa::path(
    get,
    path = "/api/v1/vacancies",
    params(VacancyQuery),
    responses(
        (status = 200, description = "Selectable units per property", body = [PropertyVacancies]),
        (status = 404, description = "Tenant not found", body = ErrorResponse)
    ),
    tag = "vacancies"
)]
pub async fn account_vacancies(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Query(query): Query<VacancyQuery>,
) -> ApiResult<Json<Vec<PropertyVacancies>>> {
    let editing_tenant = query.editing_tenant()?;
    let vacancies = state.vacancies().for_account(&ctx, editing_tenant).await?;
    Ok(Json(vacancies))
}

/// Server-sent `vacancies` events: the current list, then a fresh one after
/// every relevant change. Closing the connection stops the watcher.
#[utoipa::path(
    get,
    path = "/api/v1/properties/{uid}/vacancies/stream",
    params(("uid" = Uuid, Path, description = "Property uid"), VacancyQuery),
    responses(
        (status = 200, description = "text/event-stream of PropertyVacancies"),
        (status = 404, description = "Property or tenant not found", body = ErrorResponse)
    ),
    tag = "vacancies"
)]
pub async fn stream_vacancies(
    State(state): State<Arc<AppState>>,
    CurrentAccount(ctx): CurrentAccount,
    Path(uid): Path<Uuid>,
    Query(query): Query<VacancyQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let watch = VacancyWatch {
        ctx,
        property_uid: uid,
        editing_tenant: query.editing_tenant()?,
    };

    // Subscribe first so nothing published during the initial fetch is missed.
    let changes = state.changes().subscribe();
    let initial = state
        .vacancies()
        .for_property(&ctx, uid, watch.editing_tenant)
        .await?;

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let rx = watch_property(state.vacancies(), changes, watch, initial, cancel);
    info!(account_id = ctx.account_id, property_uid = %uid, "vacancy stream opened");

    let stream = ReceiverStream::new(rx).filter_map(move |vacancies| {
        // Held by the stream: dropping the response cancels the watcher.
        let _guard = &guard;
        match serde_json::to_string(&vacancies) {
            Ok(json) => Some(Ok(Event::default().event("vacancies").data(json))),
            Err(err) => {
                warn!(error = %err, "failed to encode vacancies event");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
