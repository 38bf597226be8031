use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::units;

/// Rows per `INSERT`, keeping bound parameters well under the Postgres limit.
const INSERT_CHUNK: usize = 1_000;

#[async_trait]
pub trait UnitsRepo: Send + Sync {
    async fn insert_many_with_txn(
        &self,
        txn: &DatabaseTransaction,
        models: Vec<units::ActiveModel>,
    ) -> Result<(), sea_orm::DbErr>;
    async fn list_by_property_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property_id: i64,
    ) -> Result<Vec<units::Model>, sea_orm::DbErr>;
    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        uid: Uuid,
    ) -> Result<Option<units::Model>, sea_orm::DbErr>;
    /// Marks the unit occupied only if it is currently vacant. Returns whether
    /// this call flipped it.
    async fn claim_vacant_with_txn(
        &self,
        txn: &DatabaseTransaction,
        unit_id: i64,
    ) -> Result<bool, sea_orm::DbErr>;
    async fn release_with_txn(
        &self,
        txn: &DatabaseTransaction,
        unit_id: i64,
    ) -> Result<(), sea_orm::DbErr>;
    async fn delete_by_ids_with_txn(
        &self,
        txn: &DatabaseTransaction,
        ids: Vec<i64>,
    ) -> Result<u64, sea_orm::DbErr>;
}

/// Every unit operation runs inside a caller-owned transaction.
#[derive(Default)]
pub struct SeaOrmUnitsRepo;

impl SeaOrmUnitsRepo {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnitsRepo for SeaOrmUnitsRepo {
    async fn insert_many_with_txn(
        &self,
        txn: &DatabaseTransaction,
        models: Vec<units::ActiveModel>,
    ) -> Result<(), sea_orm::DbErr> {
        let mut models = models.into_iter().peekable();
        while models.peek().is_some() {
            let chunk: Vec<units::ActiveModel> = models.by_ref().take(INSERT_CHUNK).collect();
            units::Entity::insert_many(chunk).exec(txn).await?;
        }
        Ok(())
    }

    async fn list_by_property_with_txn(
        &self,
        txn: &DatabaseTransaction,
        property_id: i64,
    ) -> Result<Vec<units::Model>, sea_orm::DbErr> {
        units::Entity::find()
            .filter(units::Column::PropertyId.eq(property_id))
            .order_by_asc(units::Column::Id)
            .all(txn)
            .await
    }

    async fn find_by_uid_with_txn(
        &self,
        txn: &DatabaseTransaction,
        uid: Uuid,
    ) -> Result<Option<units::Model>, sea_orm::DbErr> {
        units::Entity::find()
            .filter(units::Column::Uid.eq(uid))
            .one(txn)
            .await
    }

    async fn claim_vacant_with_txn(
        &self,
        txn: &DatabaseTransaction,
        unit_id: i64,
    ) -> Result<bool, sea_orm::DbErr> {
        let result = units::Entity::update_many()
            .col_expr(units::Column::IsOccupied, Expr::value(true))
            .filter(units::Column::Id.eq(unit_id))
            .filter(units::Column::IsOccupied.eq(false))
            .exec(txn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn release_with_txn(
        &self,
        txn: &DatabaseTransaction,
        unit_id: i64,
    ) -> Result<(), sea_orm::DbErr> {
        units::Entity::update_many()
            .col_expr(units::Column::IsOccupied, Expr::value(false))
            .filter(units::Column::Id.eq(unit_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn delete_by_ids_with_txn(
        &self,
        txn: &DatabaseTransaction,
        ids: Vec<i64>,
    ) -> Result<u64, sea_orm::DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = units::Entity::delete_many()
            .filter(units::Column::Id.is_in(ids))
            .filter(units::Column::IsOccupied.eq(false))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }
}
