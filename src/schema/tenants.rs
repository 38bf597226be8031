use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, soft_delete, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("tenants").await? {
        let mut table = Table::create();
        table
            .table(Tenants::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Tenants::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Tenants::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Tenants::AccountId).big_integer().not_null())
            .col(ColumnDef::new(Tenants::PropertyId).big_integer().not_null())
            .col(ColumnDef::new(Tenants::UnitId).big_integer())
            .col(ColumnDef::new(Tenants::Name).string().not_null())
            .col(ColumnDef::new(Tenants::Email).string().not_null())
            .col(ColumnDef::new(Tenants::Phone).string().not_null())
            .col(ColumnDef::new(Tenants::LeaseStart).date())
            .col(ColumnDef::new(Tenants::LeaseEnd).date())
            .col(
                ColumnDef::new(Tenants::AnnualRent)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(Tenants::MonthlyRent)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(ColumnDef::new(Tenants::RentDueDay).string())
            .col(
                ColumnDef::new(Tenants::PaymentStatus)
                    .string()
                    .not_null()
                    .default("due"),
            );
        timestamps(&mut table);
        soft_delete(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS tenants_uid_unique ON tenants (uid)",
                "CREATE INDEX IF NOT EXISTS tenants_account_idx \
                 ON tenants (account_id) WHERE deleted_at IS NULL",
                "ALTER TABLE tenants ADD CONSTRAINT tenants_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "ALTER TABLE tenants ADD CONSTRAINT tenants_property_fk \
                 FOREIGN KEY (property_id) REFERENCES properties (id)",
                "ALTER TABLE tenants ADD CONSTRAINT tenants_payment_status_check \
                 CHECK (payment_status IN ('paid','due','overdue'))",
            ],
        )
        .await?;
    }

    // Removed tenants give up their unit reference so vacant units can be dropped.
    execute_all(
        conn,
        &[
            "ALTER TABLE tenants ALTER COLUMN unit_id DROP NOT NULL",
            "ALTER TABLE tenants DROP CONSTRAINT IF EXISTS tenants_unit_fk",
            "ALTER TABLE tenants ADD CONSTRAINT tenants_unit_fk \
             FOREIGN KEY (unit_id) REFERENCES units (id) ON DELETE SET NULL",
            "UPDATE tenants SET unit_id = NULL \
             WHERE deleted_at IS NOT NULL AND unit_id IS NOT NULL",
            "ALTER TABLE tenants DROP CONSTRAINT IF EXISTS tenants_unit_assigned_check",
            "ALTER TABLE tenants ADD CONSTRAINT tenants_unit_assigned_check \
             CHECK (deleted_at IS NOT NULL OR unit_id IS NOT NULL)",
        ],
    )
    .await?;

    Ok(())
}

#[derive(Iden)]
enum Tenants {
    Table,
    Id,
    Uid,
    AccountId,
    PropertyId,
    UnitId,
    Name,
    Email,
    Phone,
    LeaseStart,
    LeaseEnd,
    AnnualRent,
    MonthlyRent,
    RentDueDay,
    PaymentStatus,
}
