use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, soft_delete, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("accounts").await? {
        let mut table = Table::create();
        table
            .table(Accounts::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Accounts::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Accounts::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Accounts::Email).string().not_null());
        timestamps(&mut table);
        soft_delete(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS accounts_uid_unique ON accounts (uid)",
                "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_unique \
                 ON accounts (lower(email)) WHERE deleted_at IS NULL",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Uid,
    Email,
}
