use async_trait::async_trait;
use chrono::Utc;
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    entities::{subscription_plans, user_subscriptions},
    error::ServiceError,
    model::{AccountContext, SubscriptionStatus},
    repo::{
        properties::PropertiesRepo,
        subscriptions::{ActiveSubscription, SubscriptionsRepo},
    },
    state::DatabaseClient,
};

/// `property_limit` value meaning "no limit".
pub const UNLIMITED_PROPERTIES: i32 = -1;

pub const FREE_PLAN_NAME: &str = "Free";
pub const PREMIUM_PLAN_NAME: &str = "Premium";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Free,
    Premium,
    Other,
}

/// Plan classification is keyed on the plan name. Keep every name check here.
pub fn classify_plan(name: &str) -> PlanKind {
    match name {
        FREE_PLAN_NAME => PlanKind::Free,
        PREMIUM_PLAN_NAME => PlanKind::Premium,
        _ => PlanKind::Other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanQuota {
    pub name: String,
    pub property_limit: i32,
}

impl From<&subscription_plans::Model> for PlanQuota {
    fn from(plan: &subscription_plans::Model) -> Self {
        Self {
            name: plan.name.clone(),
            property_limit: plan.property_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingProperties {
    Unbounded,
    Slots(u64),
}

/// Quota decisions for one account, derived from its active plan (if any)
/// and its current property count. Without a plan every decision denies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionGate {
    plan: Option<PlanQuota>,
    property_count: u64,
}

impl SubscriptionGate {
    pub fn new(plan: Option<PlanQuota>, property_count: u64) -> Self {
        Self {
            plan,
            property_count,
        }
    }

    pub fn closed() -> Self {
        Self::new(None, 0)
    }

    pub fn plan(&self) -> Option<&PlanQuota> {
        self.plan.as_ref()
    }

    pub fn property_count(&self) -> u64 {
        self.property_count
    }

    pub fn can_add_property(&self) -> bool {
        match self.remaining_properties() {
            RemainingProperties::Unbounded => true,
            RemainingProperties::Slots(slots) => slots > 0,
        }
    }

    pub fn remaining_properties(&self) -> RemainingProperties {
        let Some(plan) = &self.plan else {
            return RemainingProperties::Slots(0);
        };
        if plan.property_limit == UNLIMITED_PROPERTIES {
            return RemainingProperties::Unbounded;
        }
        let limit = u64::try_from(plan.property_limit).unwrap_or(0);
        RemainingProperties::Slots(limit.saturating_sub(self.property_count))
    }

    pub fn is_free_plan(&self) -> bool {
        self.kind() == Some(PlanKind::Free)
    }

    pub fn is_premium(&self) -> bool {
        self.kind() == Some(PlanKind::Premium)
    }

    fn kind(&self) -> Option<PlanKind> {
        self.plan.as_ref().map(|plan| classify_plan(&plan.name))
    }
}

/// Gate plus the rows it was derived from.
#[derive(Debug, Clone)]
pub struct GateSnapshot {
    pub subscription: Option<ActiveSubscription>,
    pub gate: SubscriptionGate,
}

impl GateSnapshot {
    fn closed() -> Self {
        Self {
            subscription: None,
            gate: SubscriptionGate::closed(),
        }
    }
}

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<subscription_plans::Model>, ServiceError>;
    /// Never fails: read errors are logged and produce a closed gate.
    async fn snapshot(&self, ctx: &AccountContext) -> GateSnapshot;
    async fn ensure_can_add_property(&self, ctx: &AccountContext) -> Result<(), ServiceError> {
        if self.snapshot(ctx).await.gate.can_add_property() {
            Ok(())
        } else {
            Err(ServiceError::PlanLimitReached)
        }
    }
    async fn change_plan(
        &self,
        ctx: &AccountContext,
        plan_name: &str,
    ) -> Result<ActiveSubscription, ServiceError>;
}

pub struct SubscriptionServiceImpl {
    db: Arc<dyn DatabaseClient>,
    subscriptions_repo: Arc<dyn SubscriptionsRepo>,
    properties_repo: Arc<dyn PropertiesRepo>,
}

impl SubscriptionServiceImpl {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        subscriptions_repo: Arc<dyn SubscriptionsRepo>,
        properties_repo: Arc<dyn PropertiesRepo>,
    ) -> Self {
        Self {
            db,
            subscriptions_repo,
            properties_repo,
        }
    }
}

#[async_trait]
impl SubscriptionService for SubscriptionServiceImpl {
    async fn list_plans(&self) -> Result<Vec<subscription_plans::Model>, ServiceError> {
        Ok(self.subscriptions_repo.list_plans().await?)
    }

    async fn snapshot(&self, ctx: &AccountContext) -> GateSnapshot {
        let subscription = match self.subscriptions_repo.find_active(ctx.account_id).await {
            Ok(subscription) => subscription,
            Err(err) => {
                error!(account_id = ctx.account_id, error = %err, "subscription lookup failed");
                return GateSnapshot::closed();
            }
        };

        let property_count = match self.properties_repo.count_by_account(ctx.account_id).await {
            Ok(count) => count,
            Err(err) => {
                error!(account_id = ctx.account_id, error = %err, "property count failed");
                return GateSnapshot::closed();
            }
        };

        let plan = subscription.as_ref().map(|(_, plan)| PlanQuota::from(plan));
        GateSnapshot {
            subscription,
            gate: SubscriptionGate::new(plan, property_count),
        }
    }

    async fn change_plan(
        &self,
        ctx: &AccountContext,
        plan_name: &str,
    ) -> Result<ActiveSubscription, ServiceError> {
        let plan_name = plan_name.trim();
        let txn = self.db.conn().begin().await?;

        let Some(plan) = self
            .subscriptions_repo
            .find_plan_by_name_with_txn(&txn, plan_name)
            .await?
        else {
            return Err(ServiceError::NotFound("plan"));
        };

        self.subscriptions_repo
            .end_active_with_txn(&txn, ctx.account_id)
            .await?;

        let subscription = self
            .subscriptions_repo
            .insert_with_txn(&txn, new_active_subscription(ctx.account_id, plan.id))
            .await?;

        txn.commit().await?;
        info!(account_id = ctx.account_id, plan = %plan.name, "subscription plan changed");
        Ok((subscription, plan))
    }
}

pub(crate) fn new_active_subscription(
    account_id: i64,
    plan_id: i64,
) -> user_subscriptions::ActiveModel {
    user_subscriptions::ActiveModel {
        uid: sea_orm::Set(Uuid::new_v4()),
        account_id: sea_orm::Set(account_id),
        plan_id: sea_orm::Set(plan_id),
        status: sea_orm::Set(SubscriptionStatus::Active.as_str().to_string()),
        started_at: sea_orm::Set(Utc::now().into()),
        ends_at: sea_orm::Set(None),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(name: &str, limit: i32, count: u64) -> SubscriptionGate {
        SubscriptionGate::new(
            Some(PlanQuota {
                name: name.to_string(),
                property_limit: limit,
            }),
            count,
        )
    }

    #[test]
    fn unlimited_plan_always_allows() {
        for count in [0, 1, 2, 1_000, u64::MAX] {
            let gate = gate("Premium", UNLIMITED_PROPERTIES, count);
            assert!(gate.can_add_property());
            assert_eq!(gate.remaining_properties(), RemainingProperties::Unbounded);
        }
    }

    #[test]
    fn limited_plan_compares_count_to_limit() {
        for limit in 0..5 {
            for count in 0..8u64 {
                let gate = gate("Free", limit, count);
                assert_eq!(gate.can_add_property(), count < limit as u64);
                assert_eq!(
                    gate.remaining_properties(),
                    RemainingProperties::Slots((limit as u64).saturating_sub(count))
                );
            }
        }
    }

    #[test]
    fn no_subscription_denies() {
        let gate = SubscriptionGate::new(None, 0);
        assert!(!gate.can_add_property());
        assert_eq!(gate.remaining_properties(), RemainingProperties::Slots(0));
        assert!(!gate.is_free_plan());
        assert!(!gate.is_premium());
        assert_eq!(SubscriptionGate::closed(), gate);
    }

    #[test]
    fn free_plan_reopens_after_removal() {
        assert!(!gate("Free", 2, 2).can_add_property());
        assert!(gate("Free", 2, 1).can_add_property());
    }

    #[test]
    fn unexpected_negative_limit_denies() {
        let gate = gate("Legacy", -5, 0);
        assert!(!gate.can_add_property());
        assert_eq!(gate.remaining_properties(), RemainingProperties::Slots(0));
    }

    #[test]
    fn classification_is_by_exact_name() {
        assert_eq!(classify_plan("Free"), PlanKind::Free);
        assert_eq!(classify_plan("Premium"), PlanKind::Premium);
        assert_eq!(classify_plan("premium"), PlanKind::Other);
        assert!(gate("Free", 2, 0).is_free_plan());
        assert!(gate("Premium", -1, 0).is_premium());
        assert!(!gate("Business", 10, 0).is_premium());
    }
}
