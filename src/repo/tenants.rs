use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{entities::tenants, state::DatabaseClient};

#[async_trait]
pub trait TenantsRepo: Send + Sync {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: tenants::ActiveModel,
    ) -> Result<tenants::Model, sea_orm::DbErr>;
    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: tenants::ActiveModel,
    ) -> Result<tenants::Model, sea_orm::DbErr>;
    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<tenants::Model>, sea_orm::DbErr>;
    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<tenants::Model>, sea_orm::DbErr>;
    async fn list_by_account(&self, account_id: i64)
        -> Result<Vec<tenants::Model>, sea_orm::DbErr>;
    async fn count_by_property_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property_id: i64,
    ) -> Result<u64, sea_orm::DbErr>;
}

pub struct SeaOrmTenantsRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmTenantsRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    fn live(account_id: i64) -> sea_orm::Select<tenants::Entity> {
        tenants::Entity::find()
            .filter(tenants::Column::AccountId.eq(account_id))
            .filter(tenants::Column::DeletedAt.is_null())
    }
}

#[async_trait]
impl TenantsRepo for SeaOrmTenantsRepo {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: tenants::ActiveModel,
    ) -> Result<tenants::Model, sea_orm::DbErr> {
        model.insert(txn).await
    }

    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: tenants::ActiveModel,
    ) -> Result<tenants::Model, sea_orm::DbErr> {
        model.update(txn).await
    }

    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<tenants::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .filter(tenants::Column::Uid.eq(uid))
            .one(self.db.conn())
            .await
    }

    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<tenants::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .filter(tenants::Column::Uid.eq(uid))
            .one(txn)
            .await
    }

    async fn list_by_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<tenants::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .order_by_desc(tenants::Column::CreatedAt)
            .all(self.db.conn())
            .await
    }

    async fn count_by_property_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property_id: i64,
    ) -> Result<u64, sea_orm::DbErr> {
        tenants::Entity::find()
            .filter(tenants::Column::PropertyId.eq(property_id))
            .filter(tenants::Column::DeletedAt.is_null())
            .count(txn)
            .await
    }
}
