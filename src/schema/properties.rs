use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, soft_delete, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("properties").await? {
        let mut table = Table::create();
        table
            .table(Properties::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Properties::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Properties::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Properties::AccountId).big_integer().not_null())
            .col(ColumnDef::new(Properties::Name).string().not_null())
            .col(ColumnDef::new(Properties::Address).string().not_null())
            .col(ColumnDef::new(Properties::PropertyType).string().not_null())
            .col(
                ColumnDef::new(Properties::UnitCount)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Properties::AnnualRentPerUnit)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(ColumnDef::new(Properties::Description).text())
            .col(
                ColumnDef::new(Properties::Status)
                    .string()
                    .not_null()
                    .default("active"),
            );
        timestamps(&mut table);
        soft_delete(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS properties_uid_unique ON properties (uid)",
                "CREATE INDEX IF NOT EXISTS properties_account_idx \
                 ON properties (account_id) WHERE deleted_at IS NULL",
                "ALTER TABLE properties ADD CONSTRAINT properties_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "ALTER TABLE properties ADD CONSTRAINT properties_type_check \
                 CHECK (property_type IN \
                 ('apartment','residential','commercial','mixed','single'))",
                "ALTER TABLE properties ADD CONSTRAINT properties_status_check \
                 CHECK (status IN ('active','maintenance','inactive'))",
                "ALTER TABLE properties ADD CONSTRAINT properties_unit_count_check \
                 CHECK (unit_count >= 0)",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Properties {
    Table,
    Id,
    Uid,
    AccountId,
    Name,
    Address,
    PropertyType,
    UnitCount,
    AnnualRentPerUnit,
    Description,
    Status,
}
