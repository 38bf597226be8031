use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use super::{execute_all, timestamps};

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if !manager.has_table("units").await? {
        let mut table = Table::create();
        table
            .table(Units::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Units::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Units::Uid)
                    .uuid()
                    .not_null()
                    .default(SimpleExpr::Custom("gen_random_uuid()".into())),
            )
            .col(ColumnDef::new(Units::PropertyId).big_integer().not_null())
            .col(ColumnDef::new(Units::UnitNumber).string().not_null())
            .col(
                ColumnDef::new(Units::IsOccupied)
                    .boolean()
                    .not_null()
                    .default(false),
            );
        timestamps(&mut table);
        manager.create_table(table.to_owned()).await?;

        // unit_number uniqueness within a property is not enforced here.
        execute_all(
            conn,
            &[
                "CREATE UNIQUE INDEX IF NOT EXISTS units_uid_unique ON units (uid)",
                "CREATE INDEX IF NOT EXISTS units_property_idx ON units (property_id)",
                "ALTER TABLE units ADD CONSTRAINT units_property_fk \
                 FOREIGN KEY (property_id) REFERENCES properties (id)",
            ],
        )
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Units {
    Table,
    Id,
    Uid,
    PropertyId,
    UnitNumber,
    IsOccupied,
}
