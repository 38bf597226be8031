use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("user_subscriptions").await? {
        let mut table = Table::create();
        table
            .table(UserSubscriptions::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(UserSubscriptions::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(UserSubscriptions::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(
                ColumnDef::new(UserSubscriptions::AccountId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(UserSubscriptions::PlanId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(UserSubscriptions::Status)
                    .string()
                    .not_null()
                    .default("active"),
            )
            .col(
                ColumnDef::new(UserSubscriptions::StartedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(SimpleExpr::Custom("now()".into())),
            )
            .col(ColumnDef::new(UserSubscriptions::EndsAt).timestamp_with_time_zone());
        timestamps(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "ALTER TABLE user_subscriptions ADD CONSTRAINT user_subscriptions_status_check \
                 CHECK (status IN ('active','cancelled','expired'))",
                "ALTER TABLE user_subscriptions ADD CONSTRAINT user_subscriptions_account_fk \
                 FOREIGN KEY (account_id) REFERENCES accounts (id)",
                "ALTER TABLE user_subscriptions ADD CONSTRAINT user_subscriptions_plan_fk \
                 FOREIGN KEY (plan_id) REFERENCES subscription_plans (id)",
                "CREATE UNIQUE INDEX IF NOT EXISTS user_subscriptions_one_active \
                 ON user_subscriptions (account_id) WHERE status = 'active'",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum UserSubscriptions {
    Table,
    Id,
    Uid,
    AccountId,
    PlanId,
    Status,
    StartedAt,
    EndsAt,
}
