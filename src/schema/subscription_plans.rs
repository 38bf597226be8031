use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

use super::{execute_all, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("subscription_plans").await? {
        let mut table = Table::create();
        table
            .table(SubscriptionPlans::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(SubscriptionPlans::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(SubscriptionPlans::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(SubscriptionPlans::Name).string().not_null())
            .col(ColumnDef::new(SubscriptionPlans::Description).string())
            .col(
                ColumnDef::new(SubscriptionPlans::Price)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(SubscriptionPlans::PropertyLimit)
                    .integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(SubscriptionPlans::Features)
                    .json_binary()
                    .not_null()
                    .default(SimpleExpr::Custom("'[]'::jsonb".into())),
            );
        timestamps(&mut table);
        manager.create_table(table.to_owned()).await?;

        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS subscription_plans_name_unique \
                 ON subscription_plans (name)",
                "ALTER TABLE subscription_plans ADD CONSTRAINT subscription_plans_limit_check \
                 CHECK (property_limit >= -1)",
            ],
        )
        .await?;
    }

    Ok(())
}

/// Inserts the static plan catalogue; existing rows are left untouched.
pub async fn seed_plans(conn: &DatabaseConnection) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        r#"
INSERT INTO subscription_plans (name, description, price, property_limit, features)
VALUES
  ('Free', 'Get started with up to two properties', 0,
   2, '["tenant_management", "billing"]'::jsonb),
  ('Premium', 'Unlimited properties for growing portfolios', 15000,
   -1, '["tenant_management", "billing", "reports", "priority_support"]'::jsonb)
ON CONFLICT (name) DO NOTHING
"#
        .to_string(),
    ))
    .await?;

    Ok(())
}

#[derive(Iden)]
enum SubscriptionPlans {
    Table,
    Id,
    Uid,
    Name,
    Description,
    Price,
    PropertyLimit,
    Features,
}
