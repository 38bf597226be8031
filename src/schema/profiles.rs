use sea_orm_migration::prelude::*;

use super::timestamps;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if !manager.has_table("profiles").await? {
        let mut table = Table::create();
        table
            .table(Profiles::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Profiles::AccountId)
                    .big_integer()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Profiles::FullName).string())
            .col(ColumnDef::new(Profiles::Phone).string())
            .col(ColumnDef::new(Profiles::Company).string());
        timestamps(&mut table);
        manager.create_table(table.to_owned()).await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Profiles {
    Table,
    AccountId,
    FullName,
    Phone,
    Company,
}
