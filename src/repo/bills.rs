use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{entities::bills, state::DatabaseClient};

#[async_trait]
pub trait BillsRepo: Send + Sync {
    async fn insert(&self, model: bills::ActiveModel) -> Result<bills::Model, sea_orm::DbErr>;
    async fn update(&self, model: bills::ActiveModel) -> Result<bills::Model, sea_orm::DbErr>;
    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<bills::Model>, sea_orm::DbErr>;
    async fn list_by_account(&self, account_id: i64) -> Result<Vec<bills::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmBillsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmBillsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillsRepo for SeaOrmBillsRepo {
    async fn insert(&self, model: bills::ActiveModel) -> Result<bills::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn update(&self, model: bills::ActiveModel) -> Result<bills::Model, sea_orm::DbErr> {
        model.update(self.db.conn()).await
    }

    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<bills::Model>, sea_orm::DbErr> {
        bills::Entity::find()
            .filter(bills::Column::AccountId.eq(account_id))
            .filter(bills::Column::Uid.eq(uid))
            .filter(bills::Column::DeletedAt.is_null())
            .one(self.db.conn())
            .await
    }

    async fn list_by_account(&self, account_id: i64) -> Result<Vec<bills::Model>, sea_orm::DbErr> {
        bills::Entity::find()
            .filter(bills::Column::AccountId.eq(account_id))
            .filter(bills::Column::DeletedAt.is_null())
            .order_by_desc(bills::Column::IssueDate)
            .order_by_desc(bills::Column::Id)
            .all(self.db.conn())
            .await
    }
}
