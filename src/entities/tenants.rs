use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: Uuid,
    pub account_id: i64,
    pub property_id: i64,
    pub unit_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub lease_start: Option<Date>,
    pub lease_end: Option<Date>,
    pub annual_rent: f64,
    pub monthly_rent: f64,
    pub rent_due_day: Option<String>,
    pub payment_status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
