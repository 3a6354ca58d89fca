//! `SeaORM` entity definitions.

pub mod categories;
pub mod manufacturers;
pub mod product_variants;
pub mod products;
pub mod sale_item_batch_allocations;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod stock_batches;
pub mod suppliers;
pub mod users;
