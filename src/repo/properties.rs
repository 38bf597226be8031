use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{
    entities::{properties, units},
    state::DatabaseClient,
};

pub type PropertyWithUnits = (properties::Model, Vec<units::Model>);

#[async_trait]
pub trait PropertiesRepo: Send + Sync {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: properties::ActiveModel,
    ) -> Result<properties::Model, sea_orm::DbErr>;
    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: properties::ActiveModel,
    ) -> Result<properties::Model, sea_orm::DbErr>;
    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr>;
    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr>;
    async fn find_by_id_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        id: i64,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr>;
    async fn count_by_account(&self, account_id: i64) -> Result<u64, sea_orm::DbErr>;
    /// Live properties of the account with their units embedded, units in
    /// insertion order.
    async fn list_with_units(
        &self,
        account_id: i64,
    ) -> Result<Vec<PropertyWithUnits>, sea_orm::DbErr>;
    async fn find_with_units(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<PropertyWithUnits>, sea_orm::DbErr>;
}

pub struct SeaOrmPropertiesRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmPropertiesRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    fn live(account_id: i64) -> sea_orm::Select<properties::Entity> {
        properties::Entity::find()
            .filter(properties::Column::AccountId.eq(account_id))
            .filter(properties::Column::DeletedAt.is_null())
    }
}

#[async_trait]
impl PropertiesRepo for SeaOrmPropertiesRepo {
    async fn insert_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: properties::ActiveModel,
    ) -> Result<properties::Model, sea_orm::DbErr> {
        model.insert(txn).await
    }

    async fn update_with_txn(
        &self,
        txn: &DatabaseTransaction,
        model: properties::ActiveModel,
    ) -> Result<properties::Model, sea_orm::DbErr> {
        model.update(txn).await
    }

    async fn find_by_uid(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .filter(properties::Column::Uid.eq(uid))
            .one(self.db.conn())
            .await
    }

    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .filter(properties::Column::Uid.eq(uid))
            .one(txn)
            .await
    }

    async fn find_by_id_with_txn(
        &self,
        txn: &DatabaseTransaction,
        account_id: i64,
        id: i64,
    ) -> Result<Option<properties::Model>, sea_orm::DbErr> {
        Self::live(account_id)
            .filter(properties::Column::Id.eq(id))
            .one(txn)
            .await
    }

    async fn count_by_account(&self, account_id: i64) -> Result<u64, sea_orm::DbErr> {
        Self::live(account_id).count(self.db.conn()).await
    }

    async fn list_with_units(
        &self,
        account_id: i64,
    ) -> Result<Vec<PropertyWithUnits>, sea_orm::DbErr> {
        Self::live(account_id)
            .find_with_related(units::Entity)
            .order_by_asc(properties::Column::Id)
            .order_by_asc(units::Column::Id)
            .all(self.db.conn())
            .await
    }

    async fn find_with_units(
        &self,
        account_id: i64,
        uid: Uuid,
    ) -> Result<Option<PropertyWithUnits>, sea_orm::DbErr> {
        let mut rows = Self::live(account_id)
            .filter(properties::Column::Uid.eq(uid))
            .find_with_related(units::Entity)
            .order_by_asc(units::Column::Id)
            .all(self.db.conn())
            .await?;
        Ok(rows.pop())
    }
}
