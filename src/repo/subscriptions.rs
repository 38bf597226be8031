use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{
    entities::{subscription_plans, user_subscriptions},
    model::SubscriptionStatus,
    state::DatabaseClient,
};

pub type ActiveSubscription = (user_subscriptions::Model, subscription_plans::Model);

#[async_trait]
pub trait SubscriptionsRepo: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<subscription_plans::Model>, sea_orm::DbErr>;
    async fn find_plan_by_name_with_txn(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<Option<subscription_plans::Model>, sea_orm::DbErr>;
    /// The account's active subscription joined with its plan.
    async fn find_active(
        &self,
        account_id: i64,
    ) -> Result<Option<ActiveSubscription>, sea_orm::DbErr>;
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: user_subscriptions::ActiveModel,
    ) -> Result<user_subscriptions::Model, sea_orm::DbErr>;
    async fn end_active_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
    ) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmSubscriptionsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmSubscriptionsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubscriptionsRepo for SeaOrmSubscriptionsRepo {
    async fn list_plans(&self) -> Result<Vec<subscription_plans::Model>, sea_orm::DbErr> {
        subscription_plans::Entity::find()
            .order_by_asc(subscription_plans::Column::Price)
            .order_by_asc(subscription_plans::Column::Id)
            .all(self.db.conn())
            .await
    }

    async fn find_plan_by_name_with_txn(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<Option<subscription_plans::Model>, sea_orm::DbErr> {
        subscription_plans::Entity::find()
            .filter(subscription_plans::Column::Name.eq(name))
            .one(txn)
            .await
    }

    async fn find_active(
        &self,
        account_id: i64,
    ) -> Result<Option<ActiveSubscription>, sea_orm::DbErr> {
        let row = user_subscriptions::Entity::find()
            .filter(user_subscriptions::Column::AccountId.eq(account_id))
            .filter(user_subscriptions::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .find_also_related(subscription_plans::Entity)
            .one(self.db.conn())
            .await?;

        match row {
            Some((subscription, Some(plan))) => Ok(Some((subscription, plan))),
            Some((subscription, None)) => Err(sea_orm::DbErr::RecordNotFound(format!(
                "plan {} missing for subscription {}",
                subscription.plan_id, subscription.uid
            ))),
            None => Ok(None),
        }
    }

    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: user_subscriptions::ActiveModel,
    ) -> Result<user_subscriptions::Model, sea_orm::DbErr> {
        model.insert(txn).await
    }

    async fn end_active_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
    ) -> Result<u64, sea_orm::DbErr> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = user_subscriptions::Entity::update_many()
            .col_expr(
                user_subscriptions::Column::Status,
                Expr::value(SubscriptionStatus::Cancelled.as_str()),
            )
            .col_expr(user_subscriptions::Column::EndsAt, Expr::value(now))
            .filter(user_subscriptions::Column::AccountId.eq(account_id))
            .filter(user_subscriptions::Column::Status.eq(SubscriptionStatus::Active.as_str()))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }
}
