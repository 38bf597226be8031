use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use std::{collections::HashMap, sync::Arc};
use tracing::info;
use uuid::Uuid;

use crate::{
    entities::{properties, tenants, units},
    error::ServiceError,
    model::{AccountContext, PropertyStatus, PropertyType},
    repo::{
        properties::{PropertiesRepo, PropertyWithUnits},
        tenants::TenantsRepo,
        units::UnitsRepo,
    },
    service::{
        changes::{ChangeFeed, ChangeKind, ChangeTable},
        fields::{matches_query, optional_text, percent, required_text, round2, NumberInput},
        subscription::SubscriptionService,
    },
    state::DatabaseClient,
};

/// Largest number of units a single property may hold.
pub const MAX_UNITS_PER_PROPERTY: u32 = 500;

pub struct CreatePropertyInput {
    pub name: String,
    pub address: String,
    pub property_type: String,
    pub units: NumberInput,
    pub annual_rent_per_unit: NumberInput,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Default)]
pub struct UpdatePropertyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub property_type: Option<String>,
    pub units: Option<NumberInput>,
    pub annual_rent_per_unit: Option<NumberInput>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PropertyFilter {
    pub q: Option<String>,
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
}

/// A property with its units and the figures derived from them.
#[derive(Debug, Clone)]
pub struct PropertyView {
    pub property: properties::Model,
    pub units: Vec<units::Model>,
    pub occupied_units: u32,
    pub occupancy_rate: u32,
    pub monthly_revenue: f64,
}

impl PropertyView {
    pub fn new(
        property: properties::Model,
        units: Vec<units::Model>,
        tenants: &[&tenants::Model],
    ) -> Self {
        let occupied_units = units.iter().filter(|unit| unit.is_occupied).count() as u32;
        let occupancy_rate = percent(f64::from(occupied_units), units.len() as f64);
        let monthly_revenue = round2(
            tenants
                .iter()
                .filter(|tenant| tenant.property_id == property.id)
                .map(|tenant| tenant.monthly_rent)
                .sum(),
        );
        Self {
            property,
            units,
            occupied_units,
            occupancy_rate,
            monthly_revenue,
        }
    }

    fn matches(&self, filter: &PropertyFilter) -> bool {
        if let Some(status) = filter.status {
            if self.property.status != status.as_str() {
                return false;
            }
        }
        if let Some(property_type) = filter.property_type {
            if self.property.property_type != property_type.as_str() {
                return false;
            }
        }
        matches_query(
            filter.q.as_deref(),
            &[self.property.name.as_str(), self.property.address.as_str()],
        )
    }
}

#[async_trait]
pub trait PropertiesService: Send + Sync {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreatePropertyInput,
    ) -> Result<PropertyView, ServiceError>;
    async fn list(
        &self,
        ctx: &AccountContext,
        filter: PropertyFilter,
    ) -> Result<Vec<PropertyView>, ServiceError>;
    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<PropertyView, ServiceError>;
    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdatePropertyInput,
    ) -> Result<PropertyView, ServiceError>;
    async fn delete(&self, ctx: &AccountContext, uid: Uuid) -> Result<(), ServiceError>;
}

pub struct PropertiesServiceImpl {
    db: Arc<dyn DatabaseClient>,
    properties_repo: Arc<dyn PropertiesRepo>,
    units_repo: Arc<dyn UnitsRepo>,
    tenants_repo: Arc<dyn TenantsRepo>,
    subscriptions: Arc<dyn SubscriptionService>,
    changes: Arc<ChangeFeed>,
}

impl PropertiesServiceImpl {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        properties_repo: Arc<dyn PropertiesRepo>,
        units_repo: Arc<dyn UnitsRepo>,
        tenants_repo: Arc<dyn TenantsRepo>,
        subscriptions: Arc<dyn SubscriptionService>,
        changes: Arc<ChangeFeed>,
    ) -> Self {
        Self {
            db,
            properties_repo,
            units_repo,
            tenants_repo,
            subscriptions,
            changes,
        }
    }

    async fn view(
        &self,
        ctx: &AccountContext,
        row: PropertyWithUnits,
    ) -> Result<PropertyView, ServiceError> {
        let occupants = self.tenants_repo.list_by_account(ctx.account_id).await?;
        let occupants: Vec<&tenants::Model> = occupants.iter().collect();
        let (property, units) = row;
        Ok(PropertyView::new(property, units, &occupants))
    }

    async fn resize_units_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property_id: i64,
        target: u32,
    ) -> Result<Option<ChangeKind>, ServiceError> {
        let existing = self
            .units_repo
            .list_by_property_with_txn(txn, property_id)
            .await?;
        match plan_unit_resize(&existing, target)? {
            UnitResize::Unchanged => Ok(None),
            UnitResize::Add(numbers) => {
                self.units_repo
                    .insert_many_with_txn(txn, new_units(property_id, numbers))
                    .await?;
                Ok(Some(ChangeKind::Insert))
            }
            UnitResize::Remove(ids) => {
                let expected = ids.len() as u64;
                let removed = self.units_repo.delete_by_ids_with_txn(txn, ids).await?;
                if removed != expected {
                    return Err(ServiceError::conflict(
                        "unit_occupied",
                        "a unit selected for removal was occupied concurrently",
                    ));
                }
                Ok(Some(ChangeKind::Delete))
            }
        }
    }
}

#[async_trait]
impl PropertiesService for PropertiesServiceImpl {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreatePropertyInput,
    ) -> Result<PropertyView, ServiceError> {
        self.subscriptions.ensure_can_add_property(ctx).await?;

        let name = required_text("name", &input.name)?;
        let address = required_text("address", &input.address)?;
        let property_type: PropertyType = input.property_type.parse()?;
        let status = match input.status.as_deref() {
            Some(status) => status.parse()?,
            None => PropertyStatus::Active,
        };
        let unit_count = checked_unit_count(&input.units)?;
        let model = properties::ActiveModel {
            uid: sea_orm::Set(Uuid::new_v4()),
            account_id: sea_orm::Set(ctx.account_id),
            name: sea_orm::Set(name),
            address: sea_orm::Set(address),
            property_type: sea_orm::Set(property_type.as_str().to_string()),
            unit_count: sea_orm::Set(unit_count_column(unit_count)?),
            annual_rent_per_unit: sea_orm::Set(input.annual_rent_per_unit.value_or_zero()),
            description: sea_orm::Set(optional_text(input.description)),
            status: sea_orm::Set(status.as_str().to_string()),
            ..Default::default()
        };

        let txn = self.db.conn().begin().await?;
        let property = self.properties_repo.insert_with_txn(&txn, model).await?;
        let numbers = (1..=unit_count).map(|n| n.to_string()).collect();
        self.units_repo
            .insert_many_with_txn(&txn, new_units(property.id, numbers))
            .await?;
        let units = self
            .units_repo
            .list_by_property_with_txn(&txn, property.id)
            .await?;
        txn.commit().await?;

        let mut changes = vec![(ChangeTable::Properties, ChangeKind::Insert)];
        if !units.is_empty() {
            changes.push((ChangeTable::Units, ChangeKind::Insert));
        }
        self.changes.publish_all(ctx.account_id, &changes);
        info!(
            account_id = ctx.account_id,
            property_uid = %property.uid,
            units = units.len(),
            "property created"
        );

        Ok(PropertyView::new(property, units, &[]))
    }

    async fn list(
        &self,
        ctx: &AccountContext,
        filter: PropertyFilter,
    ) -> Result<Vec<PropertyView>, ServiceError> {
        let rows = self.properties_repo.list_with_units(ctx.account_id).await?;
        let occupants = self.tenants_repo.list_by_account(ctx.account_id).await?;

        let mut by_property: HashMap<i64, Vec<&tenants::Model>> = HashMap::new();
        for tenant in &occupants {
            by_property.entry(tenant.property_id).or_default().push(tenant);
        }

        Ok(rows
            .into_iter()
            .map(|(property, units)| {
                let occupants = by_property.get(&property.id).map(Vec::as_slice).unwrap_or(&[]);
                PropertyView::new(property, units, occupants)
            })
            .filter(|view| view.matches(&filter))
            .collect())
    }

    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<PropertyView, ServiceError> {
        let Some(row) = self.properties_repo.find_with_units(ctx.account_id, uid).await? else {
            return Err(ServiceError::NotFound("property"));
        };
        self.view(ctx, row).await
    }

    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdatePropertyInput,
    ) -> Result<PropertyView, ServiceError> {
        let txn = self.db.conn().begin().await?;
        let Some(model) = self
            .properties_repo
            .find_by_uid_with_txn(&txn, ctx.account_id, uid)
            .await?
        else {
            return Err(ServiceError::NotFound("property"));
        };
        let property_id = model.id;

        let mut active: properties::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = sea_orm::Set(required_text("name", &name)?);
        }
        if let Some(address) = input.address {
            active.address = sea_orm::Set(required_text("address", &address)?);
        }
        if let Some(property_type) = input.property_type {
            let property_type: PropertyType = property_type.parse()?;
            active.property_type = sea_orm::Set(property_type.as_str().to_string());
        }
        if let Some(status) = input.status {
            let status: PropertyStatus = status.parse()?;
            active.status = sea_orm::Set(status.as_str().to_string());
        }
        if let Some(rent) = input.annual_rent_per_unit {
            active.annual_rent_per_unit = sea_orm::Set(rent.value_or_zero());
        }
        if let Some(description) = input.description {
            active.description = sea_orm::Set(optional_text(Some(description)));
        }

        let mut unit_change = None;
        if let Some(units) = input.units {
            let target = checked_unit_count(&units)?;
            unit_change = self.resize_units_with_txn(&txn, property_id, target).await?;
            active.unit_count = sea_orm::Set(unit_count_column(target)?);
        }

        self.properties_repo.update_with_txn(&txn, active).await?;
        txn.commit().await?;

        let mut changes = vec![(ChangeTable::Properties, ChangeKind::Update)];
        if let Some(kind) = unit_change {
            changes.push((ChangeTable::Units, kind));
        }
        self.changes.publish_all(ctx.account_id, &changes);

        self.get(ctx, uid).await
    }

    async fn delete(&self, ctx: &AccountContext, uid: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.conn().begin().await?;
        let Some(model) = self
            .properties_repo
            .find_by_uid_with_txn(&txn, ctx.account_id, uid)
            .await?
        else {
            return Err(ServiceError::NotFound("property"));
        };

        if self
            .tenants_repo
            .count_by_property_with_txn(&txn, model.id)
            .await?
            > 0
        {
            return Err(ServiceError::conflict(
                "property_has_tenants",
                "remove the property's tenants before deleting it",
            ));
        }

        let mut active: properties::ActiveModel = model.into();
        active.deleted_at = sea_orm::Set(Some(Utc::now().into()));
        active.deleted_by = sea_orm::Set(Some(ctx.account_uid));
        self.properties_repo.update_with_txn(&txn, active).await?;
        txn.commit().await?;

        self.changes.publish_all(
            ctx.account_id,
            &[(ChangeTable::Properties, ChangeKind::Delete)],
        );
        info!(account_id = ctx.account_id, property_uid = %uid, "property deleted");
        Ok(())
    }
}

fn checked_unit_count(units: &NumberInput) -> Result<u32, ServiceError> {
    let count = units.count_or_zero();
    if count > MAX_UNITS_PER_PROPERTY {
        return Err(ServiceError::validation(format!(
            "units must be at most {MAX_UNITS_PER_PROPERTY}"
        )));
    }
    Ok(count)
}

fn unit_count_column(count: u32) -> Result<i32, ServiceError> {
    i32::try_from(count).map_err(|_| ServiceError::validation("units is too large"))
}

fn new_units(property_id: i64, numbers: Vec<String>) -> Vec<units::ActiveModel> {
    numbers
        .into_iter()
        .map(|unit_number| units::ActiveModel {
            uid: sea_orm::Set(Uuid::new_v4()),
            property_id: sea_orm::Set(property_id),
            unit_number: sea_orm::Set(unit_number),
            is_occupied: sea_orm::Set(false),
            ..Default::default()
        })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
enum UnitResize {
    Unchanged,
    Add(Vec<String>),
    Remove(Vec<i64>),
}

fn numeric_unit_number(unit: &units::Model) -> Option<u64> {
    unit.unit_number.trim().parse().ok()
}

/// Growing appends numbers after the highest numeric unit number. Shrinking
/// removes the highest-numbered vacant units and never touches occupied ones.
fn plan_unit_resize(existing: &[units::Model], target: u32) -> Result<UnitResize, ServiceError> {
    let current = existing.len();
    let target = target as usize;

    if target > current {
        let start = existing.iter().filter_map(numeric_unit_number).max().unwrap_or(0);
        let numbers = (1..=(target - current) as u64)
            .map(|offset| (start + offset).to_string())
            .collect();
        return Ok(UnitResize::Add(numbers));
    }

    if target == current {
        return Ok(UnitResize::Unchanged);
    }

    let occupied = existing.iter().filter(|unit| unit.is_occupied).count();
    if target < occupied {
        return Err(ServiceError::conflict(
            "units_below_occupied",
            format!("property has {occupied} occupied units; cannot reduce to {target}"),
        ));
    }

    let mut vacant: Vec<&units::Model> = existing.iter().filter(|unit| !unit.is_occupied).collect();
    // Highest numeric first, then non-numeric labels, newest row first within ties.
    vacant.sort_by(|a, b| {
        numeric_unit_number(b)
            .cmp(&numeric_unit_number(a))
            .then(b.id.cmp(&a.id))
    });
    Ok(UnitResize::Remove(
        vacant
            .into_iter()
            .take(current - target)
            .map(|unit| unit.id)
            .collect(),
    ))
}
