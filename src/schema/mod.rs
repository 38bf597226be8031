use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

mod account_credentials;
mod accounts;
mod bills;
mod payments;
mod profiles;
mod properties;
mod subscription_plans;
mod tenants;
mod units;
mod user_subscriptions;

pub use subscription_plans::seed_plans;

const SOFT_DELETE_TABLES: [&str; 5] = [
    "accounts",
    "account_credentials",
    "properties",
    "tenants",
    "bills",
];

const ALL_TABLES: [&str; 10] = [
    "accounts",
    "account_credentials",
    "profiles",
    "subscription_plans",
    "user_subscriptions",
    "properties",
    "units",
    "tenants",
    "bills",
    "payments",
];

pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        "CREATE EXTENSION IF NOT EXISTS pgcrypto".to_string(),
    ))
    .await?;

    accounts::apply(&manager, conn).await?;
    account_credentials::apply(&manager, conn).await?;
    profiles::apply(&manager).await?;
    subscription_plans::apply(&manager, conn).await?;
    user_subscriptions::apply(&manager, conn).await?;
    properties::apply(&manager, conn).await?;
    units::apply(&manager, conn).await?;
    tenants::apply(&manager, conn).await?;
    bills::apply(&manager, conn).await?;
    payments::apply(&manager, conn).await?;
    apply_audit_invariants(conn).await?;
    seed_plans(conn).await?;

    Ok(())
}

/// `created_at` / `updated_at` columns shared by every table.
pub(crate) fn timestamps(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(SimpleExpr::Custom("now()".into())),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(SimpleExpr::Custom("now()".into())),
        )
}

/// `deleted_at` / `deleted_by` pair for soft-deletable tables.
pub(crate) fn soft_delete(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(ColumnDef::new(Alias::new("deleted_at")).timestamp_with_time_zone())
        .col(ColumnDef::new(Alias::new("deleted_by")).uuid())
}

pub(crate) async fn execute_all(
    conn: &DatabaseConnection,
    statements: &[&str],
) -> Result<(), DbErr> {
    for sql in statements {
        conn.execute(Statement::from_string(DbBackend::Postgres, ToString::to_string(*sql)))
            .await?;
    }
    Ok(())
}

async fn apply_audit_invariants(conn: &DatabaseConnection) -> Result<(), DbErr> {
    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        r#"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS trigger AS $$
BEGIN
  NEW.updated_at = now();
  RETURN NEW;
END;
$$ LANGUAGE plpgsql;
"#
        .to_string(),
    ))
    .await?;

    for table in ALL_TABLES {
        let trigger_name = format!("trg_{}_set_updated_at", table);
        conn.execute(Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
DO $$
BEGIN
  IF NOT EXISTS (
    SELECT 1
    FROM pg_trigger
    WHERE tgname = '{trigger_name}'
      AND tgrelid = '{table}'::regclass
  ) THEN
    EXECUTE 'CREATE TRIGGER {trigger_name}
             BEFORE UPDATE ON {table}
             FOR EACH ROW
             EXECUTE FUNCTION set_updated_at()';
  END IF;
END $$;
"#
            ),
        ))
        .await?;
    }

    for table in SOFT_DELETE_TABLES {
        let constraint_name = format!("{}_deleted_pair_check", table);
        conn.execute(Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
DO $$
BEGIN
  IF NOT EXISTS (
    SELECT 1
    FROM pg_constraint
    WHERE conname = '{constraint_name}'
      AND conrelid = '{table}'::regclass
  ) THEN
    EXECUTE 'ALTER TABLE {table}
             ADD CONSTRAINT {constraint_name}
             CHECK ((deleted_at IS NULL) = (deleted_by IS NULL))';
  END IF;
END $$;
"#
            ),
        ))
        .await?;
    }

    Ok(())
}
