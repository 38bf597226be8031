use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    entities::payments,
    error::ServiceError,
    model::{AccountContext, PaymentStatus},
    repo::payments::PaymentsRepo,
    service::fields::{matches_query, round2},
};

#[derive(Debug, Default, Clone)]
pub struct PaymentFilter {
    pub q: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<String>,
}

impl PaymentFilter {
    fn matches(&self, payment: &payments::Model) -> bool {
        if let Some(status) = self.status {
            if payment.status != status.as_str() {
                return false;
            }
        }
        if let Some(method) = self.method.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            if !payment.method.eq_ignore_ascii_case(method) {
                return false;
            }
        }
        matches_query(
            self.q.as_deref(),
            &[
                payment.tenant_name.as_deref().unwrap_or_default(),
                payment.unit_label.as_deref().unwrap_or_default(),
                payment.reference.as_deref().unwrap_or_default(),
                payment.method.as_str(),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PaymentSummary {
    pub total_amount: f64,
    pub confirmed_amount: f64,
    /// Everything not yet confirmed.
    pub pending_amount: f64,
    pub confirmed_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[payments::Model]) -> Self {
        let mut summary = Self::default();
        for payment in payments {
            summary.total_amount += payment.amount;
            match payment.status.parse::<PaymentStatus>() {
                Ok(PaymentStatus::Confirmed) => {
                    summary.confirmed_amount += payment.amount;
                    summary.confirmed_count += 1;
                }
                Ok(PaymentStatus::Pending) => summary.pending_count += 1,
                Ok(PaymentStatus::Failed) => summary.failed_count += 1,
                Err(_) => {}
            }
        }
        summary.total_amount = round2(summary.total_amount);
        summary.confirmed_amount = round2(summary.confirmed_amount);
        summary.pending_amount = round2(summary.total_amount - summary.confirmed_amount);
        summary
    }
}

#[derive(Debug, Clone)]
pub struct PaymentList {
    pub payments: Vec<payments::Model>,
    pub summary: PaymentSummary,
}

#[async_trait]
pub trait PaymentsService: Send + Sync {
    async fn list(
        &self,
        ctx: &AccountContext,
        filter: PaymentFilter,
    ) -> Result<PaymentList, ServiceError>;
}

pub struct PaymentsServiceImpl {
    payments_repo: Arc<dyn PaymentsRepo>,
}

impl PaymentsServiceImpl {
    pub fn new(payments_repo: Arc<dyn PaymentsRepo>) -> Self {
        Self { payments_repo }
    }
}

#[async_trait]
impl PaymentsService for PaymentsServiceImpl {
    async fn list(
        &self,
        ctx: &AccountContext,
        filter: PaymentFilter,
    ) -> Result<PaymentList, ServiceError> {
        let payments: Vec<payments::Model> = self
            .payments_repo
            .list_by_account(ctx.account_id)
            .await?
            .into_iter()
            .filter(|payment| filter.matches(payment))
            .collect();
        let summary = PaymentSummary::from_payments(&payments);
        Ok(PaymentList { payments, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn payment(amount: f64, status: &str, method: &str) -> payments::Model {
        payments::Model {
            id: 1,
            uid: Uuid::new_v4(),
            account_id: 1,
            tenant_id: None,
            tenant_name: Some("Funke Bello".to_string()),
            unit_label: Some("A2".to_string()),
            amount,
            paid_on: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            method: method.to_string(),
            reference: Some("TRX-1001".to_string()),
            payment_type: "rent".to_string(),
            status: status.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn summary_splits_by_status() {
        let payments = [
            payment(200_000.0, "confirmed", "Bank Transfer"),
            payment(150_000.0, "confirmed", "Mobile Money"),
            payment(100_000.0, "pending", "Cash"),
            payment(50_000.0, "failed", "Bank Transfer"),
        ];
        let summary = PaymentSummary::from_payments(&payments);
        assert_eq!(summary.total_amount, 500_000.0);
        assert_eq!(summary.confirmed_amount, 350_000.0);
        assert_eq!(summary.pending_amount, 150_000.0);
        assert_eq!(
            (summary.confirmed_count, summary.pending_count, summary.failed_count),
            (2, 1, 1)
        );
    }

    #[test]
    fn filter_by_method_is_case_insensitive() {
        let filter = PaymentFilter {
            method: Some("cash".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&payment(1.0, "pending", "Cash")));
        assert!(!filter.matches(&payment(1.0, "pending", "Bank Transfer")));
    }

    #[test]
    fn filter_by_reference_text() {
        let filter = PaymentFilter {
            q: Some("trx-1001".to_string()),
            status: Some(PaymentStatus::Confirmed),
            ..Default::default()
        };
        assert!(filter.matches(&payment(1.0, "confirmed", "Cash")));
        assert!(!filter.matches(&payment(1.0, "failed", "Cash")));
    }
}
