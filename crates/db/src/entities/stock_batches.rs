//! `SeaORM` Entity for stock_batches table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockwise_core::ledger::BatchLevel;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_variant_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub quantity_received: i32,
    pub quantity_remaining: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub buy_price_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub sell_price_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_sale_price_per_unit: Decimal,
    pub received_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_variants::Entity",
        from = "Column::ProductVariantId",
        to = "super::product_variants::Column::Id"
    )]
    ProductVariants,
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
    #[sea_orm(has_many = "super::sale_item_batch_allocations::Entity")]
    SaleItemBatchAllocations,
}

impl Related<super::product_variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariants.def()
    }
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl Related<super::sale_item_batch_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItemBatchAllocations.def()
    }
}

impl Model {
    /// Received and remaining quantity as the ledger sees them.
    #[must_use]
    pub const fn level(&self) -> BatchLevel {
        BatchLevel {
            batch_id: self.id,
            quantity_received: self.quantity_received,
            quantity_remaining: self.quantity_remaining,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
