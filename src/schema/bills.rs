use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, soft_delete, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("bills").await? {
        let mut table = Table::create();
        table
            .table(Bills::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Bills::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Bills::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Bills::AccountId).big_integer().not_null())
            .col(ColumnDef::new(Bills::TenantId).big_integer())
            .col(ColumnDef::new(Bills::TenantName).string())
            .col(ColumnDef::new(Bills::UnitLabel).string())
            .col(ColumnDef::new(Bills::BillType).string().not_null())
            .col(
                ColumnDef::new(Bills::Amount)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(Bills::IssueDate)
                    .date()
                    .not_null()
                    .default(SimpleExpr::Custom("CURRENT_DATE".into())),
            )
            .col(ColumnDef::new(Bills::DueDate).date().not_null())
            .col(
                ColumnDef::new(Bills::Status)
                    .string()
                    .not_null()
                    .default("draft"),
            )
            .col(ColumnDef::new(Bills::Description).text());
        timestamps(&mut table);
        soft_delete(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS bills_uid_unique ON bills (uid)",
                "CREATE INDEX IF NOT EXISTS bills_account_idx \
                 ON bills (account_id) WHERE deleted_at IS NULL",
                "ALTER TABLE bills ADD CONSTRAINT bills_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "ALTER TABLE bills ADD CONSTRAINT bills_tenant_fk \
                 FOREIGN KEY (tenant_id) REFERENCES tenants (id)",
                "ALTER TABLE bills ADD CONSTRAINT bills_type_check \
                 CHECK (bill_type IN ('rent','utility','maintenance'))",
                "ALTER TABLE bills ADD CONSTRAINT bills_status_check \
                 CHECK (status IN ('draft','sent','paid','overdue'))",
                "ALTER TABLE bills ADD CONSTRAINT bills_recipient_check \
                 CHECK (tenant_id IS NOT NULL OR tenant_name IS NOT NULL)",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Bills {
    Table,
    Id,
    Uid,
    AccountId,
    TenantId,
    TenantName,
    UnitLabel,
    BillType,
    Amount,
    IssueDate,
    DueDate,
    Status,
    Description,
}
