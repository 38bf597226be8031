use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("payments").await? {
        let mut table = Table::create();
        table
            .table(Payments::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Payments::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Payments::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Payments::AccountId).big_integer().not_null())
            .col(ColumnDef::new(Payments::TenantId).big_integer())
            .col(ColumnDef::new(Payments::TenantName).string())
            .col(ColumnDef::new(Payments::UnitLabel).string())
            .col(
                ColumnDef::new(Payments::Amount)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(ColumnDef::new(Payments::PaidOn).date().not_null())
            .col(ColumnDef::new(Payments::Method).string().not_null())
            .col(ColumnDef::new(Payments::Reference).string())
            .col(
                ColumnDef::new(Payments::PaymentType)
                    .string()
                    .not_null()
                    .default("rent"),
            )
            .col(
                ColumnDef::new(Payments::Status)
                    .string()
                    .not_null()
                    .default("pending"),
            );
        timestamps(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS payments_uid_unique ON payments (uid)",
                "CREATE INDEX IF NOT EXISTS payments_account_idx ON payments (account_id)",
                "ALTER TABLE payments ADD CONSTRAINT payments_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "ALTER TABLE payments ADD CONSTRAINT payments_status_check \
                 CHECK (status IN ('pending','confirmed','failed'))",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    Uid,
    AccountId,
    TenantId,
    TenantName,
    UnitLabel,
    Amount,
    PaidOn,
    Method,
    Reference,
    PaymentType,
    Status,
}
