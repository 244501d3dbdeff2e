//! Join table between financial records and tags.
//!
//! Pure `(financial_record_id, tag_id)` pairs without payload.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_record_tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub financial_record_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::records::Entity",
        from = "Column::FinancialRecordId",
        to = "super::records::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FinancialRecord,
    #[sea_orm(
        belongs_to = "super::tags::Entity",
        from = "Column::TagId",
        to = "super::tags::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tag,
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialRecord.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
