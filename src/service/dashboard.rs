use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    entities::{bills, tenants},
    error::ServiceError,
    model::{AccountContext, BillStatus, TenantPaymentStatus},
    repo::{
        bills::BillsRepo,
        properties::{PropertiesRepo, PropertyWithUnits},
        tenants::TenantsRepo,
    },
    service::{
        bills::display_status,
        fields::{percent, round2},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub property_count: usize,
    pub total_units: usize,
    pub occupied_units: usize,
    pub occupancy_rate: u32,
    pub active_tenants: usize,
    pub tenants_paid: usize,
    pub tenants_due: usize,
    pub tenants_overdue: usize,
    pub monthly_revenue: f64,
    /// Paid bill amount over issued (non-draft) bill amount, in percent.
    pub collection_rate: u32,
    /// Bills whose displayed status is overdue, drafts included.
    pub overdue_bills: usize,
}

impl DashboardSummary {
    pub fn compute(
        properties: &[PropertyWithUnits],
        tenants: &[tenants::Model],
        bills: &[bills::Model],
        today: NaiveDate,
    ) -> Self {
        let total_units: usize = properties.iter().map(|(_, units)| units.len()).sum();
        let occupied_units = properties
            .iter()
            .flat_map(|(_, units)| units.iter())
            .filter(|unit| unit.is_occupied)
            .count();

        let count_status = |status: TenantPaymentStatus| {
            tenants
                .iter()
                .filter(|tenant| tenant.payment_status == status.as_str())
                .count()
        };

        let mut issued = 0.0;
        let mut paid = 0.0;
        let mut overdue_bills = 0;
        for bill in bills {
            let Ok(stored) = bill.status.parse::<BillStatus>() else {
                continue;
            };
            // Same rule as the bill list, so past-due drafts count as overdue.
            if display_status(stored, bill.due_date, today) == BillStatus::Overdue {
                overdue_bills += 1;
            }
            if stored == BillStatus::Draft {
                continue;
            }
            issued += bill.amount;
            if stored == BillStatus::Paid {
                paid += bill.amount;
            }
        }

        Self {
            property_count: properties.len(),
            total_units,
            occupied_units,
            occupancy_rate: percent(occupied_units as f64, total_units as f64),
            active_tenants: tenants.len(),
            tenants_paid: count_status(TenantPaymentStatus::Paid),
            tenants_due: count_status(TenantPaymentStatus::Due),
            tenants_overdue: count_status(TenantPaymentStatus::Overdue),
            monthly_revenue: round2(tenants.iter().map(|tenant| tenant.monthly_rent).sum()),
            collection_rate: percent(paid, issued),
            overdue_bills,
        }
    }
}

#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn summary(&self, ctx: &AccountContext) -> Result<DashboardSummary, ServiceError>;
}

pub struct DashboardServiceImpl {
    properties_repo: Arc<dyn PropertiesRepo>,
    tenants_repo: Arc<dyn TenantsRepo>,
    bills_repo: Arc<dyn BillsRepo>,
}

impl DashboardServiceImpl {
    pub fn new(
        properties_repo: Arc<dyn PropertiesRepo>,
        tenants_repo: Arc<dyn TenantsRepo>,
        bills_repo: Arc<dyn BillsRepo>,
    ) -> Self {
        Self {
            properties_repo,
            tenants_repo,
            bills_repo,
        }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn summary(&self, ctx: &AccountContext) -> Result<DashboardSummary, ServiceError> {
        let (properties, tenants, bills) = tokio::try_join!(
            self.properties_repo.list_with_units(ctx.account_id),
            self.tenants_repo.list_by_account(ctx.account_id),
            self.bills_repo.list_by_account(ctx.account_id),
        )?;
        Ok(DashboardSummary::compute(
            &properties,
            &tenants,
            &bills,
            Utc::now().date_naive(),
        ))
    }
}
