//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod allocation;
pub mod category;
pub mod manufacturer;
pub mod product;
mod retry;
pub mod reversal;
pub mod sale;
pub mod sale_item;
pub mod stock_batch;
pub mod supplier;
pub mod user;

pub use allocation::{AllocateInput, AllocationOutcome, AllocationRepository};
pub use category::CategoryRepository;
pub use manufacturer::{CreateManufacturerInput, ManufacturerRepository};
pub use product::{CreateProductInput, ProductRepository};
pub use reversal::{ReversalOutcome, ReversalRepository};
pub use sale::{CreateSaleInput, SaleRepository, UpdateSaleInput};
pub use sale_item::{SaleItemFilter, SaleItemRepository, SaleItemWithAllocations};
pub use stock_batch::{StockBatchFilter, StockBatchRepository};
pub use supplier::{CreateSupplierInput, SupplierRepository};
pub use user::UserRepository;
