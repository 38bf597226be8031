use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: Uuid,
    pub account_id: i64,
    pub tenant_id: Option<i64>,
    pub tenant_name: Option<String>,
    pub unit_label: Option<String>,
    pub amount: f64,
    pub paid_on: Date,
    pub method: String,
    pub reference: Option<String>,
    pub payment_type: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
