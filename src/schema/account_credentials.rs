use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, soft_delete, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("account_credentials").await? {
        let mut table = Table::create();
        table
            .table(AccountCredentials::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(AccountCredentials::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(AccountCredentials::AccountId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(AccountCredentials::Provider)
                    .string()
                    .not_null(),
            )
            .col(ColumnDef::new(AccountCredentials::ProviderSubject).string())
            .col(ColumnDef::new(AccountCredentials::PasswordHash).string());
        timestamps(&mut table);
        soft_delete(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "ALTER TABLE account_credentials ADD CONSTRAINT account_credentials_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "CREATE UNIQUE INDEX IF NOT EXISTS account_credentials_unique_provider \
                 ON account_credentials (account_id, provider) WHERE deleted_at IS NULL",
                "CREATE UNIQUE INDEX IF NOT EXISTS account_credentials_unique_subject \
                 ON account_credentials (provider, provider_subject) \
                 WHERE provider_subject IS NOT NULL AND deleted_at IS NULL",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum AccountCredentials {
    Table,
    Id,
    AccountId,
    Provider,
    ProviderSubject,
    PasswordHash,
}
