//! `SeaORM` Entity for sale_item_batch_allocations table.
//!
//! Rows are append-only; reversal leaves them in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_item_batch_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_item_id: Uuid,
    pub stock_batch_id: Uuid,
    pub quantity_from_batch: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale_items::Entity",
        from = "Column::SaleItemId",
        to = "super::sale_items::Column::Id"
    )]
    SaleItems,
    #[sea_orm(
        belongs_to = "super::stock_batches::Entity",
        from = "Column::StockBatchId",
        to = "super::stock_batches::Column::Id"
    )]
    StockBatches,
}

impl Related<super::sale_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl Related<super::stock_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
