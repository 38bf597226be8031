use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    entities::bills,
    error::ServiceError,
    model::{AccountContext, BillStatus, BillType},
    repo::{bills::BillsRepo, tenants::TenantsRepo},
    service::{
        changes::{ChangeFeed, ChangeKind, ChangeTable},
        fields::{matches_query, optional_text, NumberInput},
    },
};

pub struct CreateBillInput {
    pub tenant: Option<Uuid>,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub bill_type: String,
    pub amount: NumberInput,
    pub issue_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct UpdateBillInput {
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

#[derive(Debug, Default, Clone)]
pub struct BillFilter {
    pub q: Option<String>,
    /// Compared against the displayed status, so `overdue` includes bills
    /// that are only overdue by date.
    pub status: Option<BillStatus>,
    pub bill_type: Option<BillType>,
}

/// Status shown to the user. Unpaid bills past their due date read as
/// overdue; the stored status is left as is.
pub fn display_status(stored: BillStatus, due_date: NaiveDate, today: NaiveDate) -> BillStatus {
    if stored != BillStatus::Paid && due_date < today {
        BillStatus::Overdue
    } else {
        stored
    }
}

#[derive(Debug, Clone)]
pub struct BillView {
    pub bill: bills::Model,
    pub tenant_uid: Option<Uuid>,
    pub display_status: BillStatus,
}

impl BillView {
    pub fn new(bill: bills::Model, tenant_uid: Option<Uuid>, today: NaiveDate) -> Self {
        let stored = match bill.status.parse::<BillStatus>() {
            Ok(status) => status,
            Err(err) => {
                warn!(bill_uid = %bill.uid, error = %err, "unexpected stored bill status");
                BillStatus::Draft
            }
        };
        Self {
            display_status: display_status(stored, bill.due_date, today),
            tenant_uid,
            bill,
        }
    }

    fn matches(&self, filter: &BillFilter) -> bool {
        if let Some(status) = filter.status {
            if self.display_status != status {
                return false;
            }
        }
        if let Some(bill_type) = filter.bill_type {
            if self.bill.bill_type != bill_type.as_str() {
                return false;
            }
        }
        matches_query(
            filter.q.as_deref(),
            &[
                self.bill.tenant_name.as_deref().unwrap_or_default(),
                self.bill.unit_label.as_deref().unwrap_or_default(),
                self.bill.description.as_deref().unwrap_or_default(),
                self.bill.bill_type.as_str(),
            ],
        )
    }
}

#[async_trait]
pub trait BillsService: Send + Sync {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreateBillInput,
    ) -> Result<BillView, ServiceError>;
    async fn list(&self, ctx: &AccountContext, filter: BillFilter)
        -> Result<Vec<BillView>, ServiceError>;
    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<BillView, ServiceError>;
    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdateBillInput,
    ) -> Result<BillView, ServiceError>;
}

pub struct BillsServiceImpl {
    bills_repo: Arc<dyn BillsRepo>,
    tenants_repo: Arc<dyn TenantsRepo>,
    changes: Arc<ChangeFeed>,
}

impl BillsServiceImpl {
    pub fn new(
        bills_repo: Arc<dyn BillsRepo>,
        tenants_repo: Arc<dyn TenantsRepo>,
        changes: Arc<ChangeFeed>,
    ) -> Self {
        Self {
            bills_repo,
            tenants_repo,
            changes,
        }
    }

    async fn tenant_uids(&self, ctx: &AccountContext) -> Result<HashMap<i64, Uuid>, ServiceError> {
        Ok(self
            .tenants_repo
            .list_by_account(ctx.account_id)
            .await?
            .into_iter()
            .map(|tenant| (tenant.id, tenant.uid))
            .collect())
    }

    fn view(&self, bill: bills::Model, tenant_uids: &HashMap<i64, Uuid>) -> BillView {
        let tenant_uid = bill.tenant_id.and_then(|id| tenant_uids.get(&id).copied());
        BillView::new(bill, tenant_uid, Utc::now().date_naive())
    }
}

#[async_trait]
impl BillsService for BillsServiceImpl {
    async fn create(
        &self,
        ctx: &AccountContext,
        input: CreateBillInput,
    ) -> Result<BillView, ServiceError> {
        let bill_type: BillType = input.bill_type.parse()?;
        let mut tenant_name = optional_text(input.tenant_name);

        let tenant = match input.tenant {
            Some(uid) => Some(
                self.tenants_repo
                    .find_by_uid(ctx.account_id, uid)
                    .await?
                    .ok_or(ServiceError::NotFound("tenant"))?,
            ),
            None => None,
        };
        if let Some(tenant) = &tenant {
            tenant_name.get_or_insert_with(|| tenant.name.clone());
        }
        if tenant_name.is_none() {
            return Err(ServiceError::validation("tenant or tenant_name is required"));
        }

        let mut model = bills::ActiveModel {
            uid: sea_orm::Set(Uuid::new_v4()),
            account_id: sea_orm::Set(ctx.account_id),
            tenant_id: sea_orm::Set(tenant.as_ref().map(|tenant| tenant.id)),
            tenant_name: sea_orm::Set(tenant_name),
            unit_label: sea_orm::Set(optional_text(input.unit_label)),
            bill_type: sea_orm::Set(bill_type.as_str().to_string()),
            amount: sea_orm::Set(input.amount.value_or_zero()),
            due_date: sea_orm::Set(input.due_date),
            description: sea_orm::Set(optional_text(input.description)),
            ..Default::default()
        };
        if let Some(issue_date) = input.issue_date {
            model.issue_date = sea_orm::Set(issue_date);
        }
        if let Some(status) = input.status {
            let status: BillStatus = status.parse()?;
            model.status = sea_orm::Set(status.as_str().to_string());
        }

        let bill = self.bills_repo.insert(model).await?;
        self.changes
            .publish_all(ctx.account_id, &[(ChangeTable::Bills, ChangeKind::Insert)]);
        info!(account_id = ctx.account_id, bill_uid = %bill.uid, "bill created");

        let tenant_uid = tenant.map(|tenant| tenant.uid);
        Ok(BillView::new(bill, tenant_uid, Utc::now().date_naive()))
    }

    async fn list(
        &self,
        ctx: &AccountContext,
        filter: BillFilter,
    ) -> Result<Vec<BillView>, ServiceError> {
        let tenant_uids = self.tenant_uids(ctx).await?;
        Ok(self
            .bills_repo
            .list_by_account(ctx.account_id)
            .await?
            .into_iter()
            .map(|bill| self.view(bill, &tenant_uids))
            .filter(|view| view.matches(&filter))
            .collect())
    }

    async fn get(&self, ctx: &AccountContext, uid: Uuid) -> Result<BillView, ServiceError> {
        let Some(bill) = self.bills_repo.find_by_uid(ctx.account_id, uid).await? else {
            return Err(ServiceError::NotFound("bill"));
        };
        let tenant_uids = self.tenant_uids(ctx).await?;
        Ok(self.view(bill, &tenant_uids))
    }

    async fn update(
        &self,
        ctx: &AccountContext,
        uid: Uuid,
        input: UpdateBillInput,
    ) -> Result<BillView, ServiceError> {
        let Some(bill) = self.bills_repo.find_by_uid(ctx.account_id, uid).await? else {
            return Err(ServiceError::NotFound("bill"));
        };
        let mut tenant_id = bill.tenant_id;
        let mut tenant_name = bill.tenant_name.clone();
        let mut active: bills::ActiveModel = bill.into();

        if let Some(tenant_uid) = input.tenant {
            let tenant = self
                .tenants_repo
                .find_by_uid(ctx.account_id, tenant_uid)
                .await?
                .ok_or(ServiceError::NotFound("tenant"))?;
            tenant_id = Some(tenant.id);
            if input.tenant_name.is_none() {
                tenant_name = Some(tenant.name);
            }
        }
        if let Some(name) = input.tenant_name {
            tenant_name = optional_text(Some(name));
        }
        if tenant_id.is_none() && tenant_name.is_none() {
            return Err(ServiceError::validation("tenant or tenant_name is required"));
        }
        active.tenant_id = sea_orm::Set(tenant_id);
        active.tenant_name = sea_orm::Set(tenant_name);

        if let Some(unit_label) = input.unit_label {
            active.unit_label = sea_orm::Set(optional_text(Some(unit_label)));
        }
        if let Some(bill_type) = input.bill_type {
            let bill_type: BillType = bill_type.parse()?;
            active.bill_type = sea_orm::Set(bill_type.as_str().to_string());
        }
        if let Some(amount) = input.amount {
            active.amount = sea_orm::Set(amount.value_or_zero());
        }
        if let Some(issue_date) = input.issue_date {
            active.issue_date = sea_orm::Set(issue_date);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = sea_orm::Set(due_date);
        }
        if let Some(status) = input.status {
            let status: BillStatus = status.parse()?;
            active.status = sea_orm::Set(status.as_str().to_string());
        }
        if let Some(description) = input.description {
            active.description = sea_orm::Set(optional_text(Some(description)));
        }

        let bill = self.bills_repo.update(active).await?;
        self.changes
            .publish_all(ctx.account_id, &[(ChangeTable::Bills, ChangeKind::Update)]);

        let tenant_uids = self.tenant_uids(ctx).await?;
        Ok(self.view(bill, &tenant_uids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unpaid_bills_past_due_display_overdue() {
        let today = date(2024, 2, 1);
        let due = date(2024, 1, 20);
        assert_eq!(display_status(BillStatus::Sent, due, today), BillStatus::Overdue);
        assert_eq!(display_status(BillStatus::Draft, due, today), BillStatus::Overdue);
        assert_eq!(display_status(BillStatus::Paid, due, today), BillStatus::Paid);
    }

    #[test]
    fn bills_due_today_or_later_keep_stored_status() {
        let today = date(2024, 1, 20);
        assert_eq!(
            display_status(BillStatus::Sent, date(2024, 1, 20), today),
            BillStatus::Sent
        );
        assert_eq!(
            display_status(BillStatus::Draft, date(2024, 3, 1), today),
            BillStatus::Draft
        );
    }

    fn bill(status: &str, due_date: NaiveDate) -> bills::Model {
        bills::Model {
            id: 1,
            uid: Uuid::new_v4(),
            account_id: 1,
            tenant_id: None,
            tenant_name: Some("Bola Ade".to_string()),
            unit_label: Some("Flat 2".to_string()),
            bill_type: "maintenance".to_string(),
            amount: 15000.0,
            issue_date: date(2024, 1, 1),
            due_date,
            status: status.to_string(),
            description: Some("Generator servicing".to_string()),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn overdue_filter_uses_display_status() {
        let today = date(2024, 2, 1);
        let view = BillView::new(bill("sent", date(2024, 1, 20)), None, today);
        assert_eq!(view.bill.status, "sent");
        assert!(view.matches(&BillFilter {
            status: Some(BillStatus::Overdue),
            ..Default::default()
        }));
        assert!(!view.matches(&BillFilter {
            status: Some(BillStatus::Sent),
            ..Default::default()
        }));
    }

    #[test]
    fn text_and_type_filters() {
        let view = BillView::new(bill("draft", date(2030, 1, 1)), None, date(2024, 1, 1));
        assert!(view.matches(&BillFilter {
            q: Some("generator".to_string()),
            bill_type: Some(BillType::Maintenance),
            ..Default::default()
        }));
        assert!(!view.matches(&BillFilter {
            bill_type: Some(BillType::Rent),
            ..Default::default()
        }));
    }
}
