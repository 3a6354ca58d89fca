//! Soft-delete transitions applied uniformly to every entity.
//!
//! Each entity implements [`SoftDeletable`] to name its marker columns and
//! count the active rows that block its deletion. [`soft_delete`] and
//! [`restore`] lock the row, consult `SoftDeletePolicy` and flip the marker in
//! one transaction.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use stockwise_core::StockError;
use stockwise_core::lifecycle::{Activatable, EntityKind, SoftDeletePolicy};
use uuid::Uuid;

use crate::entities::{
    categories, manufacturers, product_variants, products, sale_items, sales, stock_batches,
    suppliers, users,
};
use crate::error::db_err;

/// An entity with a nullable `deleted_at` marker.
#[async_trait]
pub trait SoftDeletable: EntityTrait {
    /// Lifecycle kind of the entity.
    const KIND: EntityKind;

    /// Primary key column.
    fn id_column() -> Self::Column;

    /// The `deleted_at` marker column.
    fn deleted_at_column() -> Self::Column;

    /// Active rows that block deleting `id`.
    async fn live_dependents(_txn: &DatabaseTransaction, _id: Uuid) -> Result<u64, DbErr> {
        Ok(0)
    }

    /// Parents that must be active for `row` to be restored.
    fn parents(_row: &Self::Model) -> Vec<(EntityKind, Uuid)> {
        Vec::new()
    }
}

/// Loads a row by id, locking it for the rest of the transaction.
pub(crate) async fn lock_row<E, C>(conn: &C, id: Uuid) -> Result<E::Model, StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StockError::not_found(E::KIND.name(), id))
}

/// Loads an active row by id, taking a shared lock so it cannot be deleted
/// while the caller attaches a dependent to it.
pub(crate) async fn lock_active_shared<E, C>(conn: &C, id: Uuid) -> Result<E::Model, StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .filter(E::deleted_at_column().is_null())
        .lock_shared()
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| StockError::not_found(E::KIND.name(), id))
}

async fn is_active_shared<E>(txn: &DatabaseTransaction, id: Uuid) -> Result<bool, StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
{
    let row = E::find()
        .filter(E::id_column().eq(id))
        .filter(E::deleted_at_column().is_null())
        .lock_shared()
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(row.is_some())
}

async fn parent_is_active(
    txn: &DatabaseTransaction,
    kind: EntityKind,
    id: Uuid,
) -> Result<bool, StockError> {
    match kind {
        EntityKind::ProductVariant => is_active_shared::<product_variants::Entity>(txn, id).await,
        EntityKind::Product => is_active_shared::<products::Entity>(txn, id).await,
        EntityKind::Supplier => is_active_shared::<suppliers::Entity>(txn, id).await,
        EntityKind::Manufacturer => is_active_shared::<manufacturers::Entity>(txn, id).await,
        EntityKind::Category => is_active_shared::<categories::Entity>(txn, id).await,
        EntityKind::Sale => is_active_shared::<sales::Entity>(txn, id).await,
        EntityKind::StockBatch | EntityKind::SaleItem | EntityKind::User => Err(
            StockError::Internal(format!("{} has no dependents", kind.name())),
        ),
    }
}

async fn set_marker<E>(
    txn: &DatabaseTransaction,
    id: Uuid,
    marker: Option<DateTime<FixedOffset>>,
) -> Result<(), StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
{
    let expect_deleted = marker.is_none();
    let mut update = E::update_many()
        .col_expr(E::deleted_at_column(), Expr::value(marker))
        .filter(E::id_column().eq(id));
    update = if expect_deleted {
        update.filter(E::deleted_at_column().is_not_null())
    } else {
        update.filter(E::deleted_at_column().is_null())
    };

    let result = update.exec(txn).await.map_err(db_err)?;
    if result.rows_affected == 0 {
        return Err(StockError::ConcurrentModification);
    }
    Ok(())
}

/// Moves an entity from `Active` to `Deleted`.
///
/// Fails with `NotFound` when no row exists, `AlreadyDeleted` when the row is
/// already deleted and `HasActiveDependents` when live dependents remain.
pub async fn soft_delete<E>(db: &DatabaseConnection, id: Uuid) -> Result<E::Model, StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
{
    let txn = db.begin().await.map_err(db_err)?;

    let row = lock_row::<E, _>(&txn, id).await?;
    let dependents = E::live_dependents(&txn, id).await.map_err(db_err)?;
    SoftDeletePolicy::check_delete(E::KIND, &row, dependents)?;

    set_marker::<E>(&txn, id, Some(Utc::now().fixed_offset())).await?;
    let row = lock_row::<E, _>(&txn, id).await?;

    txn.commit().await.map_err(db_err)?;

    tracing::info!(entity = E::KIND.name(), %id, "soft-deleted");
    Ok(row)
}

/// Moves an entity from `Deleted` back to `Active`.
///
/// Parents named by [`SoftDeletable::parents`] are share-locked and must be
/// active, otherwise the restore is a state error.
pub async fn restore<E>(db: &DatabaseConnection, id: Uuid) -> Result<E::Model, StockError>
where
    E: SoftDeletable,
    E::Model: Activatable,
{
    let txn = db.begin().await.map_err(db_err)?;

    let row = lock_row::<E, _>(&txn, id).await?;
    SoftDeletePolicy::check_restore(E::KIND, &row)?;
    for (parent, parent_id) in E::parents(&row) {
        let active = parent_is_active(&txn, parent, parent_id).await?;
        SoftDeletePolicy::check_restore_parent(E::KIND, id, parent, parent_id, active)?;
    }

    set_marker::<E>(&txn, id, None).await?;
    let row = lock_row::<E, _>(&txn, id).await?;

    txn.commit().await.map_err(db_err)?;

    tracing::info!(entity = E::KIND.name(), %id, "restored");
    Ok(row)
}

/// Counts active rows of `E` whose `column` equals `id`.
async fn count_active<E, C>(
    txn: &DatabaseTransaction,
    column: C,
    deleted_at: C,
    id: Uuid,
) -> Result<u64, DbErr>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait,
    E::Model: Sync,
{
    E::find()
        .filter(column.eq(id))
        .filter(deleted_at.is_null())
        .count(txn)
        .await
}

macro_rules! activatable {
    ($($module:ident),+ $(,)?) => {
        $(
            impl Activatable for $module::Model {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn deleted_at(&self) -> Option<DateTime<FixedOffset>> {
                    self.deleted_at
                }
            }
        )+
    };
}

activatable!(
    stock_batches,
    sales,
    sale_items,
    suppliers,
    manufacturers,
    products,
    product_variants,
    categories,
    users,
);

#[async_trait]
impl SoftDeletable for stock_batches::Entity {
    const KIND: EntityKind = EntityKind::StockBatch;

    fn id_column() -> Self::Column {
        stock_batches::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        stock_batches::Column::DeletedAt
    }

    fn parents(row: &stock_batches::Model) -> Vec<(EntityKind, Uuid)> {
        let mut parents = vec![(EntityKind::ProductVariant, row.product_variant_id)];
        parents.extend(row.supplier_id.map(|id| (EntityKind::Supplier, id)));
        parents
    }
}

#[async_trait]
impl SoftDeletable for sales::Entity {
    const KIND: EntityKind = EntityKind::Sale;

    fn id_column() -> Self::Column {
        sales::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        sales::Column::DeletedAt
    }

    async fn live_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        count_active::<sale_items::Entity, _>(
            txn,
            sale_items::Column::SaleId,
            sale_items::Column::DeletedAt,
            id,
        )
        .await
    }
}

#[async_trait]
impl SoftDeletable for sale_items::Entity {
    const KIND: EntityKind = EntityKind::SaleItem;

    fn id_column() -> Self::Column {
        sale_items::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        sale_items::Column::DeletedAt
    }
}

#[async_trait]
impl SoftDeletable for suppliers::Entity {
    const KIND: EntityKind = EntityKind::Supplier;

    fn id_column() -> Self::Column {
        suppliers::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        suppliers::Column::DeletedAt
    }

    async fn live_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        count_active::<stock_batches::Entity, _>(
            txn,
            stock_batches::Column::SupplierId,
            stock_batches::Column::DeletedAt,
            id,
        )
        .await
    }
}

#[async_trait]
impl SoftDeletable for manufacturers::Entity {
    const KIND: EntityKind = EntityKind::Manufacturer;

    fn id_column() -> Self::Column {
        manufacturers::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        manufacturers::Column::DeletedAt
    }

    async fn live_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        count_active::<products::Entity, _>(
            txn,
            products::Column::ManufacturerId,
            products::Column::DeletedAt,
            id,
        )
        .await
    }
}

#[async_trait]
impl SoftDeletable for products::Entity {
    const KIND: EntityKind = EntityKind::Product;

    fn id_column() -> Self::Column {
        products::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        products::Column::DeletedAt
    }

    fn parents(row: &products::Model) -> Vec<(EntityKind, Uuid)> {
        row.manufacturer_id
            .map(|id| (EntityKind::Manufacturer, id))
            .into_iter()
            .chain(row.category_id.map(|id| (EntityKind::Category, id)))
            .collect()
    }

    async fn live_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        count_active::<product_variants::Entity, _>(
            txn,
            product_variants::Column::ProductId,
            product_variants::Column::DeletedAt,
            id,
        )
        .await
    }
}

#[async_trait]
impl SoftDeletable for product_variants::Entity {
    const KIND: EntityKind = EntityKind::ProductVariant;

    fn id_column() -> Self::Column {
        product_variants::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        product_variants::Column::DeletedAt
    }

    fn parents(row: &product_variants::Model) -> Vec<(EntityKind, Uuid)> {
        vec![(EntityKind::Product, row.product_id)]
    }

    async fn live_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        count_active::<stock_batches::Entity, _>(
            txn,
            stock_batches::Column::ProductVariantId,
            stock_batches::Column::DeletedAt,
            id,
        )
        .await
    }
}

#[async_trait]
impl SoftDeletable for categories::Entity {
    const KIND: EntityKind = EntityKind::Category;

    fn id_column() -> Self::Column {
        categories::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        categories::Column::DeletedAt
    }
}

#[async_trait]
impl SoftDeletable for users::Entity {
    const KIND: EntityKind = EntityKind::User;

    fn id_column() -> Self::Column {
        users::Column::Id
    }

    fn deleted_at_column() -> Self::Column {
        users::Column::DeletedAt
    }
}
