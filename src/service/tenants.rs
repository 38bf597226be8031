use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::{properties, tenants, units},
    error::ServiceError,
    model::{AccountContext, TenantPaymentStatus},
    repo::{
        properties::{PropertiesRepo, PropertyWithUnits},
        tenants::TenantsRepo,
        units::UnitsRepo,
    },
    service::{
        changes::{ChangeFeed, ChangeKind, ChangeTable},
        fields::{matches_query, monthly_from_annual, optional_text, required_text, NumberInput},
    },
    state::DatabaseClient,
};

pub struct CreateTenantInput {
    pub property: Uuid,
    pub unit: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub annual_rent: NumberInput,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent_due_day: Option<String>,
}

#[derive(Default)]
pub struct UpdateTenantInput {
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

#[derive(Debug, Default, Clone)]
pub struct TenantFilter {
    pub q: Option<String>,
    pub payment_status: Option<TenantPaymentStatus>,
    pub property: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ContactLinks {
    pub email: Option<String>,
    pub whatsapp: Option<String>,
}

impl ContactLinks {
    pub fn new(email: &str, phone: &str) -> Self {
        let email = email.trim();
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        Self {
            email: (!email.is_empty()).then(|| format!("mailto:{email}")),
            whatsapp: (!digits.is_empty()).then(|| format!("https://wa.me/{digits}")),
        }
    }
}

/// True when the lease ends today or within the next `window_days` days.
pub fn lease_expiring_soon(
    lease_end: Option<NaiveDate>,
    today: NaiveDate,
    window_days: i64,
) -> bool {
    let Some(lease_end) = lease_end else {
        return false;
    };
    let remaining = (lease_end - today).num_days();
    (0..=window_days).contains(&remaining)
}

#[derive(Debug, Clone)]
pub struct TenantView {
    pub tenant: tenants::Model,
    pub property_uid: Option<Uuid>,
    pub property_name: Option<String>,
    pub unit_uid: Option<Uuid>,
    pub unit_number: Option<String>,
    pub lease_expiring_soon: bool,
    pub contact: ContactLinks,
}

impl TenantView {
    fn matches(&self, filter: &TenantFilter) -> bool {
        if let Some(status) = filter.payment_status {
            if self.tenant.payment_status != status.as_str() {
                return false;
            }
        }
        if let Some(property) = filter.property {
            if self.property_uid != Some(property) {
                return false;
            }
        }
        matches_query(
            filter.q.as_deref(),
            &[
                self.tenant.name.as_str(),
                self.tenant.email.as_str(),
                self.tenant.phone.as_str(),
                self.unit_number.as_deref().unwrap_or_default(),
                self.property_name.as_deref().unwrap_or_default(),
            ],
        )
    }
}

#[async_trait]
pub trait TenantsService: Send + Sync {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreateTenantInput,
    ) -> Result<TenantView, ServiceError>;
    async fn list(
        &self,
        ctx: &AccountContext,
        filter: TenantFilter,
    ) -> Result<Vec<TenantView>, ServiceError>;
    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<TenantView, ServiceError>;
    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdateTenantInput,
    ) -> Result<TenantView, ServiceError>;
    async fn delete(&self, ctx: &AccountContext, uid: Uuid) -> Result<(), ServiceError>;
}

pub struct TenantsServiceImpl {
    db: Arc<dyn DatabaseClient>,
    tenants_repo: Arc<dyn TenantsRepo>,
    properties_repo: Arc<dyn PropertiesRepo>,
    units_repo: Arc<dyn UnitsRepo>,
    changes: Arc<ChangeFeed>,
    lease_expiry_warning_days: i64,
}

impl TenantsServiceImpl {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        tenants_repo: Arc<dyn TenantsRepo>,
        properties_repo: Arc<dyn PropertiesRepo>,
        units_repo: Arc<dyn UnitsRepo>,
        changes: Arc<ChangeFeed>,
        lease_expiry_warning_days: i64,
    ) -> Self {
        Self {
            db,
            tenants_repo,
            properties_repo,
            units_repo,
            changes,
            lease_expiry_warning_days,
        }
    }

    async fn properties_by_id(
        &self,
        ctx: &AccountContext,
    ) -> Result<HashMap<i64, PropertyWithUnits>, ServiceError> {
        Ok(self
            .properties_repo
            .list_with_units(ctx.account_id)
            .await?
            .into_iter()
            .map(|row| (row.0.id, row))
            .collect())
    }

    fn view(
        &self,
        tenant: tenants::Model,
        properties: &HashMap<i64, PropertyWithUnits>,
        today: NaiveDate,
    ) -> TenantView {
        let row = properties.get(&tenant.property_id);
        let unit = row.and_then(|(_, units)| {
            units
                .iter()
                .find(|unit| Some(unit.id) == tenant.unit_id)
        });
        TenantView {
            property_uid: row.map(|(property, _)| property.uid),
            property_name: row.map(|(property, _)| property.name.clone()),
            unit_uid: unit.map(|unit| unit.uid),
            unit_number: unit.map(|unit| unit.unit_number.clone()),
            lease_expiring_soon: lease_expiring_soon(
                tenant.lease_end,
                today,
                self.lease_expiry_warning_days,
            ),
            contact: ContactLinks::new(&tenant.email, &tenant.phone),
            tenant,
        }
    }

    /// Resolves a unit inside a property of the account and marks it
    /// occupied. Fails with `unit_occupied` if it is already taken.
    async fn claim_unit_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property: &properties::Model,
        unit_uid: Uuid,
    ) -> Result<units::Model, ServiceError> {
        let unit = self
            .units_repo
            .find_by_uid_with_txn(txn, unit_uid)
            .await?
            .filter(|unit| unit.property_id == property.id)
            .ok_or(ServiceError::NotFound("unit"))?;

        if !self.units_repo.claim_vacant_with_txn(txn, unit.id).await? {
            return Err(ServiceError::conflict(
                "unit_occupied",
                format!("unit {} is already occupied", unit.unit_number),
            ));
        }
        Ok(unit)
    }

    async fn property_with_txn(
        &self,
        txn: &DatabaseTransaction,
        ctx: &AccountContext,
        uid: Uuid,
    ) -> Result<properties::Model, ServiceError> {
        self.properties_repo
            .find_by_uid_with_txn(txn, ctx.account_id, uid)
            .await?
            .ok_or(ServiceError::NotFound("property"))
    }
}

#[async_trait]
impl TenantsService for TenantsServiceImpl {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreateTenantInput,
    ) -> Result<TenantView, ServiceError> {
        let name = required_text("name", &input.name)?;
        let email = required_text("email", &input.email)?;
        let phone = required_text("phone", &input.phone)?;
        let annual_rent = input.annual_rent.value_or_zero();

        let txn = self.db.conn().begin().await?;
        let property = self.property_with_txn(&txn, ctx, input.property).await?;
        let unit = self.claim_unit_with_txn(&txn, &property, input.unit).await?;

        let model = tenants::ActiveModel {
            uid: sea_orm::Set(Uuid::new_v4()),
            account_id: sea_orm::Set(ctx.account_id),
            property_id: sea_orm::Set(property.id),
            unit_id: sea_orm::Set(Some(unit.id)),
            name: sea_orm::Set(name),
            email: sea_orm::Set(email),
            phone: sea_orm::Set(phone),
            lease_start: sea_orm::Set(input.lease_start),
            lease_end: sea_orm::Set(input.lease_end),
            annual_rent: sea_orm::Set(annual_rent),
            monthly_rent: sea_orm::Set(monthly_from_annual(annual_rent)),
            rent_due_day: sea_orm::Set(optional_text(input.rent_due_day)),
            payment_status: sea_orm::Set(TenantPaymentStatus::Due.as_str().to_string()),
            ..Default::default()
        };
        let tenant = self.tenants_repo.insert_with_txn(&txn, model).await?;
        txn.commit().await?;

        self.changes.publish_all(
            ctx.account_id,
            &[
                (ChangeTable::Tenants, ChangeKind::Insert),
                (ChangeTable::Units, ChangeKind::Update),
            ],
        );
        info!(
            account_id = ctx.account_id,
            tenant_uid = %tenant.uid,
            unit = %unit.unit_number,
            "tenant assigned"
        );

        self.get(ctx, tenant.uid).await
    }

    async fn list(
        &self,
        ctx: &AccountContext,
        filter: TenantFilter,
    ) -> Result<Vec<TenantView>, ServiceError> {
        let properties = self.properties_by_id(ctx).await?;
        let today = Utc::now().date_naive();
        Ok(self
            .tenants_repo
            .list_by_account(ctx.account_id)
            .await?
            .into_iter()
            .map(|tenant| self.view(tenant, &properties, today))
            .filter(|view| view.matches(&filter))
            .collect())
    }

    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<TenantView, ServiceError> {
        let Some(tenant) = self.tenants_repo.find_by_uid(ctx.account_id, uid).await? else {
            return Err(ServiceError::NotFound("tenant"));
        };
        let properties = self.properties_by_id(ctx).await?;
        Ok(self.view(tenant, &properties, Utc::now().date_naive()))
    }

    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdateTenantInput,
    ) -> Result<TenantView, ServiceError> {
        let txn = self.db.conn().begin().await?;
        let Some(tenant) = self
            .tenants_repo
            .find_by_uid_with_txn(&txn, ctx.account_id, uid)
            .await?
        else {
            return Err(ServiceError::NotFound("tenant"));
        };

        let mut moved = false;
        let mut active: tenants::ActiveModel = tenant.clone().into();

        if input.property.is_some() || input.unit.is_some() {
            let property = match input.property {
                Some(property_uid) => self.property_with_txn(&txn, ctx, property_uid).await?,
                None => self
                    .properties_repo
                    .find_by_id_with_txn(&txn, ctx.account_id, tenant.property_id)
                    .await?
                    .ok_or(ServiceError::NotFound("property"))?,
            };
            let property_changed = property.id != tenant.property_id;

            match input.unit {
                None if property_changed => {
                    return Err(ServiceError::validation(
                        "unit is required when the property changes",
                    ));
                }
                None => {}
                Some(unit_uid) => {
                    let requested = self.units_repo.find_by_uid_with_txn(&txn, unit_uid).await?;
                    let keeps_unit = requested.as_ref().is_some_and(|unit| {
                        Some(unit.id) == tenant.unit_id && unit.property_id == property.id
                    });
                    if !keeps_unit {
                        let unit = self.claim_unit_with_txn(&txn, &property, unit_uid).await?;
                        if let Some(previous) = tenant.unit_id {
                            self.units_repo.release_with_txn(&txn, previous).await?;
                        }
                        active.property_id = sea_orm::Set(property.id);
                        active.unit_id = sea_orm::Set(Some(unit.id));
                        moved = true;
                    }
                }
            }
        }

        if let Some(name) = input.name {
            active.name = sea_orm::Set(required_text("name", &name)?);
        }
        if let Some(email) = input.email {
            active.email = sea_orm::Set(required_text("email", &email)?);
        }
        if let Some(phone) = input.phone {
            active.phone = sea_orm::Set(required_text("phone", &phone)?);
        }
        if let Some(annual_rent) = input.annual_rent {
            let annual_rent = annual_rent.value_or_zero();
            active.annual_rent = sea_orm::Set(annual_rent);
            active.monthly_rent = sea_orm::Set(monthly_from_annual(annual_rent));
        }
        if let Some(lease_start) = input.lease_start {
            active.lease_start = sea_orm::Set(Some(lease_start));
        }
        if let Some(lease_end) = input.lease_end {
            active.lease_end = sea_orm::Set(Some(lease_end));
        }
        if let Some(rent_due_day) = input.rent_due_day {
            active.rent_due_day = sea_orm::Set(optional_text(Some(rent_due_day)));
        }
        if let Some(payment_status) = input.payment_status {
            let payment_status: TenantPaymentStatus = payment_status.parse()?;
            active.payment_status = sea_orm::Set(payment_status.as_str().to_string());
        }

        self.tenants_repo.update_with_txn(&txn, active).await?;
        txn.commit().await?;

        let mut changes = vec![(ChangeTable::Tenants, ChangeKind::Update)];
        if moved {
            changes.push((ChangeTable::Units, ChangeKind::Update));
            info!(account_id = ctx.account_id, tenant_uid = %uid, "tenant reassigned");
        }
        self.changes.publish_all(ctx.account_id, &changes);

        self.get(ctx, uid).await
    }

    async fn delete(&self, ctx: &AccountContext, uid: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.conn().begin().await?;
        let Some(tenant) = self
            .tenants_repo
            .find_by_uid_with_txn(&txn, ctx.account_id, uid)
            .await?
        else {
            return Err(ServiceError::NotFound("tenant"));
        };

        if let Some(unit_id) = tenant.unit_id {
            self.units_repo.release_with_txn(&txn, unit_id).await?;
        }
        let mut active: tenants::ActiveModel = tenant.into();
        // Drop the reference so the freed unit can later be removed by a resize.
        active.unit_id = sea_orm::Set(None);
        active.deleted_at = sea_orm::Set(Some(Utc::now().into()));
        active.deleted_by = sea_orm::Set(Some(ctx.account_uid));
        self.tenants_repo.update_with_txn(&txn, active).await?;
        txn.commit().await?;

        self.changes.publish_all(
            ctx.account_id,
            &[
                (ChangeTable::Tenants, ChangeKind::Delete),
                (ChangeTable::Units, ChangeKind::Update),
            ],
        );
        info!(account_id = ctx.account_id, tenant_uid = %uid, "tenant removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn contact_links_from_fields() {
        let links = ContactLinks::new("ada@example.com", "+234 (801) 555-0101");
        assert_eq!(links.email.as_deref(), Some("mailto:ada@example.com"));
        assert_eq!(links.whatsapp.as_deref(), Some("https://wa.me/2348015550101"));
    }

    #[test]
    fn contact_links_skip_empty_fields() {
        let links = ContactLinks::new(" ", "n/a");
        assert_eq!(links.email, None);
        assert_eq!(links.whatsapp, None);
    }

    #[test]
    fn lease_expiry_window() {
        let today = date(2024, 1, 1);
        assert!(lease_expiring_soon(Some(date(2024, 1, 1)), today, 30));
        assert!(lease_expiring_soon(Some(date(2024, 1, 31)), today, 30));
        assert!(!lease_expiring_soon(Some(date(2024, 2, 1)), today, 30));
        assert!(!lease_expiring_soon(Some(date(2023, 12, 31)), today, 30));
        assert!(!lease_expiring_soon(None, today, 30));
    }

    fn view(name: &str, status: TenantPaymentStatus, property: Uuid) -> TenantView {
        TenantView {
            tenant: tenants::Model {
                id: 1,
                uid: Uuid::new_v4(),
                account_id: 1,
                property_id: 1,
                unit_id: Some(1),
                name: name.to_string(),
                email: "tenant@example.com".to_string(),
                phone: "08010000000".to_string(),
                lease_start: None,
                lease_end: None,
                annual_rent: 1_200_000.0,
                monthly_rent: 100_000.0,
                rent_due_day: None,
                payment_status: status.as_str().to_string(),
                created_at: Utc::now().into(),
                updated_at: Utc::now().into(),
                deleted_at: None,
                deleted_by: None,
            },
            property_uid: Some(property),
            property_name: Some("Lekki Gardens".to_string()),
            unit_uid: None,
            unit_number: Some("3".to_string()),
            lease_expiring_soon: false,
            contact: ContactLinks::new("tenant@example.com", "08010000000"),
        }
    }

    #[test]
    fn filters_by_status_property_and_text() {
        let property = Uuid::new_v4();
        let tenant = view("Chinedu Okafor", TenantPaymentStatus::Overdue, property);

        assert!(tenant.matches(&TenantFilter::default()));
        assert!(tenant.matches(&TenantFilter {
            q: Some("okafor".to_string()),
            payment_status: Some(TenantPaymentStatus::Overdue),
            property: Some(property),
        }));
        assert!(tenant.matches(&TenantFilter {
            q: Some("lekki".to_string()),
            ..Default::default()
        }));
        assert!(!tenant.matches(&TenantFilter {
            payment_status: Some(TenantPaymentStatus::Paid),
            ..Default::default()
        }));
        assert!(!tenant.matches(&TenantFilter {
            property: Some(Uuid::new_v4()),
            ..Default::default()
        }));
    }
}
