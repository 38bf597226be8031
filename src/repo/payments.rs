use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{entities::payments, state::DatabaseClient};

#[async_trait]
pub trait PaymentsRepo: Send + Sync {
    async fn list_by_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<payments::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmPaymentsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmPaymentsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentsRepo for SeaOrmPaymentsRepo {
    async fn list_by_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<payments::Model>, sea_orm::DbErr> {
        payments::Entity::find()
            .filter(payments::Column::AccountId.eq(account_id))
            .order_by_desc(payments::Column::PaidOn)
            .order_by_desc(payments::Column::Id)
            .all(self.db.conn())
            .await
    }
}
