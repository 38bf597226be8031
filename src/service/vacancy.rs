//! Vacant-unit resolution for tenant assignment forms.
//!
//! A unit is selectable when it is vacant, or when it is the unit held by the
//! tenant currently being edited (so an edit that keeps the unit still shows
//! it). The exception only applies inside that tenant's own property.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{properties, tenants, units},
    error::ServiceError,
    model::AccountContext,
    repo::{properties::PropertiesRepo, tenants::TenantsRepo},
    service::changes::ChangeEvent,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VacantUnit {
    pub uid: Uuid,
    pub unit_number: String,
    pub is_occupied: bool,
}

impl From<&units::Model> for VacantUnit {
    fn from(unit: &units::Model) -> Self {
        Self {
            uid: unit.uid,
            unit_number: unit.unit_number.clone(),
            is_occupied: unit.is_occupied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PropertyVacancies {
    pub property_uid: Uuid,
    pub property_name: String,
    pub units: Vec<VacantUnit>,
}

/// Units that can be offered for assignment, in the order given.
pub fn resolve_vacancies(
    units: &[units::Model],
    editing_unit_number: Option<&str>,
) -> Vec<VacantUnit> {
    units
        .iter()
        .filter(|unit| {
            !unit.is_occupied || Some(unit.unit_number.as_str()) == editing_unit_number
        })
        .map(VacantUnit::from)
        .collect()
}

/// Unit number held by `tenant` within `property`, if the tenant lives there.
fn editing_unit_number<'a>(
    property: &properties::Model,
    units: &'a [units::Model],
    tenant: Option<&tenants::Model>,
) -> Option<&'a str> {
    let tenant = tenant.filter(|tenant| tenant.property_id == property.id)?;
    units
        .iter()
        .find(|unit| Some(unit.id) == tenant.unit_id)
        .map(|unit| unit.unit_number.as_str())
}

fn property_vacancies(
    property: &properties::Model,
    units: &[units::Model],
    tenant: Option<&tenants::Model>,
) -> PropertyVacancies {
    PropertyVacancies {
        property_uid: property.uid,
        property_name: property.name.clone(),
        units: resolve_vacancies(units, editing_unit_number(property, units, tenant)),
    }
}

#[async_trait]
pub trait VacancyService: Send + Sync {
    async fn for_property(
        &self,
        ctx: &AccountContext,
        property_uid: Uuid,
        editing_tenant: Option<Uuid>,
    ) -> Result<PropertyVacancies, ServiceError>;
    async fn for_account(
        &self,
        ctx: &AccountContext,
        editing_tenant: Option<Uuid>,
    ) -> Result<Vec<PropertyVacancies>, ServiceError>;
}

pub struct VacancyServiceImpl {
    properties_repo: Arc<dyn PropertiesRepo>,
    tenants_repo: Arc<dyn TenantsRepo>,
}

impl VacancyServiceImpl {
    pub fn new(
        properties_repo: Arc<dyn PropertiesRepo>,
        tenants_repo: Arc<dyn TenantsRepo>,
    ) -> Self {
        Self {
            properties_repo,
            tenants_repo,
        }
    }

    async fn editing_tenant(
        &self,
        ctx: &AccountContext,
        editing_tenant: Option<Uuid>,
    ) -> Result<Option<tenants::Model>, ServiceError> {
        let Some(uid) = editing_tenant else {
            return Ok(None);
        };
        match self.tenants_repo.find_by_uid(ctx.account_id, uid).await? {
            Some(tenant) => Ok(Some(tenant)),
            None => Err(ServiceError::NotFound("tenant")),
        }
    }
}

#[async_trait]
impl VacancyService for VacancyServiceImpl {
    async fn for_property(
        &self,
        ctx: &AccountContext,
        property_uid: Uuid,
        editing_tenant: Option<Uuid>,
    ) -> Result<PropertyVacancies, ServiceError> {
        let tenant = self.editing_tenant(ctx, editing_tenant).await?;
        let Some((property, units)) = self
            .properties_repo
            .find_with_units(ctx.account_id, property_uid)
            .await?
        else {
            return Err(ServiceError::NotFound("property"));
        };
        Ok(property_vacancies(&property, &units, tenant.as_ref()))
    }

    async fn for_account(
        &self,
        ctx: &AccountContext,
        editing_tenant: Option<Uuid>,
    ) -> Result<Vec<PropertyVacancies>, ServiceError> {
        let tenant = self.editing_tenant(ctx, editing_tenant).await?;
        let rows = self.properties_repo.list_with_units(ctx.account_id).await?;
        Ok(rows
            .iter()
            .map(|(property, units)| property_vacancies(property, units, tenant.as_ref()))
            .collect())
    }
}

/// Parameters of one live vacancy view.
#[derive(Debug, Clone, Copy)]
pub struct VacancyWatch {
    pub ctx: AccountContext,
    pub property_uid: Uuid,
    pub editing_tenant: Option<Uuid>,
}

/// Streams `initial`, then a fresh list after every change that can affect
/// vacancies for the same account. A failed re-fetch keeps the last list
/// (nothing is sent). The task stops when `cancel` fires, when the receiver
/// is dropped, or when the property disappears; a fetch that completes after
/// cancellation is discarded.
pub fn watch_property(
    service: Arc<dyn VacancyService>,
    mut changes: broadcast::Receiver<ChangeEvent>,
    watch: VacancyWatch,
    initial: PropertyVacancies,
    cancel: CancellationToken,
) -> mpsc::Receiver<PropertyVacancies> {
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        if tx.send(initial).await.is_err() {
            return;
        }

        loop {
            let refresh = tokio::select! {
                _ = cancel.cancelled() => break,
                received = changes.recv() => match received {
                    Ok(event) => {
                        event.account_id == watch.ctx.account_id && event.affects_vacancies()
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "vacancy watcher lagged behind change feed");
                        true
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };
            if !refresh {
                continue;
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = service.for_property(
                    &watch.ctx,
                    watch.property_uid,
                    watch.editing_tenant,
                ) => result,
            };
            if cancel.is_cancelled() {
                break;
            }

            match result {
                Ok(vacancies) => {
                    if tx.send(vacancies).await.is_err() {
                        break;
                    }
                }
                Err(ServiceError::NotFound(what)) => {
                    info!(property_uid = %watch.property_uid, what, "vacancy watch target gone");
                    break;
                }
                Err(err) => {
                    warn!(
                        account_id = watch.ctx.account_id,
                        property_uid = %watch.property_uid,
                        error = %err,
                        "vacancy refresh failed; keeping previous list"
                    );
                }
            }
        }

        debug!(property_uid = %watch.property_uid, "vacancy watcher stopped");
    });

    rx
}
