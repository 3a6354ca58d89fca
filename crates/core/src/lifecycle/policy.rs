//! Soft-delete transitions and dependency rules.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StockError;

/// Lifecycle state derived from the `deleted_at` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Marker is null.
    Active,
    /// Marker is set.
    Deleted,
}

/// Anything carrying a soft-delete marker.
pub trait Activatable {
    /// Primary key of the row.
    fn id(&self) -> Uuid;

    /// When the row was soft-deleted, if it was.
    fn deleted_at(&self) -> Option<DateTime<FixedOffset>>;

    /// Whether the row is active.
    fn is_active(&self) -> bool {
        self.deleted_at().is_none()
    }

    /// Current lifecycle state.
    fn lifecycle_state(&self) -> LifecycleState {
        if self.is_active() {
            LifecycleState::Active
        } else {
            LifecycleState::Deleted
        }
    }
}

/// Entities that participate in the soft-delete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Stock batch.
    StockBatch,
    /// Sale header.
    Sale,
    /// Sale line item.
    SaleItem,
    /// Supplier.
    Supplier,
    /// Manufacturer.
    Manufacturer,
    /// Product.
    Product,
    /// Product variant.
    ProductVariant,
    /// Product category.
    Category,
    /// User.
    User,
}

impl EntityKind {
    /// Human-readable entity name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StockBatch => "stock batch",
            Self::Sale => "sale",
            Self::SaleItem => "sale item",
            Self::Supplier => "supplier",
            Self::Manufacturer => "manufacturer",
            Self::Product => "product",
            Self::ProductVariant => "product variant",
            Self::Category => "category",
            Self::User => "user",
        }
    }

    /// Dependents that must all be deleted before this entity can be.
    #[must_use]
    pub const fn blocking_dependent(self) -> Option<Self> {
        match self {
            Self::Sale => Some(Self::SaleItem),
            Self::Supplier | Self::ProductVariant => Some(Self::StockBatch),
            Self::Manufacturer => Some(Self::Product),
            Self::Product => Some(Self::ProductVariant),
            Self::StockBatch | Self::SaleItem | Self::Category | Self::User => None,
        }
    }

    /// Plural form of the dependent's name.
    const fn plural(self) -> &'static str {
        match self {
            Self::StockBatch => "stock batches",
            Self::Sale => "sales",
            Self::SaleItem => "sale items",
            Self::Supplier => "suppliers",
            Self::Manufacturer => "manufacturers",
            Self::Product => "products",
            Self::ProductVariant => "product variants",
            Self::Category => "categories",
            Self::User => "users",
        }
    }
}

/// Stateless policy for soft-delete transitions.
pub struct SoftDeletePolicy;

impl SoftDeletePolicy {
    /// Checks whether `entity` may move from `Active` to `Deleted`.
    ///
    /// `live_dependents` is the number of active rows of
    /// [`EntityKind::blocking_dependent`]; it is ignored for kinds without one.
    ///
    /// Sale items are never deleted through this path, their deletion is a
    /// reversal.
    pub fn check_delete<E: Activatable + ?Sized>(
        kind: EntityKind,
        entity: &E,
        live_dependents: u64,
    ) -> Result<(), StockError> {
        if !entity.is_active() {
            return Err(StockError::AlreadyDeleted {
                entity: kind.name(),
                id: entity.id(),
            });
        }

        if let Some(dependent) = kind.blocking_dependent()
            && live_dependents > 0
        {
            return Err(StockError::HasActiveDependents {
                entity: kind.name(),
                id: entity.id(),
                dependent: dependent.plural(),
                count: live_dependents,
            });
        }

        Ok(())
    }

    /// Checks whether `entity` may move from `Deleted` back to `Active`.
    pub fn check_restore<E: Activatable + ?Sized>(
        kind: EntityKind,
        entity: &E,
    ) -> Result<(), StockError> {
        if entity.is_active() {
            return Err(StockError::NotDeleted {
                entity: kind.name(),
                id: entity.id(),
            });
        }

        if kind == EntityKind::SaleItem {
            return Err(StockError::State(format!(
                "sale item {} was reversed and cannot be restored; create a new sale item instead",
                entity.id()
            )));
        }

        Ok(())
    }

    /// Checks that a parent the restored entity hangs off is active.
    ///
    /// Mirrors the rule that dependents are only attached to active parents.
    pub fn check_restore_parent(
        kind: EntityKind,
        id: Uuid,
        parent: EntityKind,
        parent_id: Uuid,
        parent_active: bool,
    ) -> Result<(), StockError> {
        if parent_active {
            return Ok(());
        }
        Err(StockError::State(format!(
            "cannot restore {} {id}: {} {parent_id} is deleted",
            kind.name(),
            parent.name()
        )))
    }
}
