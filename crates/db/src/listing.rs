//! Search, sort, pagination and `include_deleted` for list endpoints.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse, SortOrder};

use crate::entities::{
    categories, manufacturers, product_variants, products, sale_items, sales, stock_batches,
    suppliers, users,
};
use crate::error::db_err;
use crate::soft_delete::SoftDeletable;

/// An entity that can be listed with [`ListQuery`].
pub trait Listable: SoftDeletable {
    /// Columns matched case-insensitively by `search`.
    fn search_columns() -> Vec<Self::Column>;

    /// Maps a `sort` name onto a whitelisted column.
    fn sort_column(name: &str) -> Option<Self::Column>;

    /// Column used when no `sort` is given.
    fn default_sort() -> Self::Column;
}

/// Escapes `LIKE` metacharacters in user input.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Applies `query` to `select` and fetches one page.
///
/// Unknown sort columns are a validation error rather than silently ignored.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    mut select: Select<E>,
    query: &ListQuery,
) -> Result<PageResponse<E::Model>, StockError>
where
    E: Listable,
    E::Model: Sync,
{
    if !query.include_deleted {
        select = select.filter(E::deleted_at_column().is_null());
    }

    let search_columns = E::search_columns();
    if let Some(term) = query.search_term()
        && !search_columns.is_empty()
    {
        let pattern = format!("%{}%", escape_like(term));
        let condition = search_columns
            .into_iter()
            .fold(Condition::any(), |cond, column| {
                cond.add(Expr::col((E::default(), column)).ilike(pattern.as_str()))
            });
        select = select.filter(condition);
    }

    let sort = match query.sort.as_deref() {
        Some(name) => E::sort_column(name)
            .ok_or_else(|| StockError::Validation(format!("cannot sort by '{name}'")))?,
        None => E::default_sort(),
    };
    let order = match query.order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };
    select = select
        .order_by(sort, order.clone())
        .order_by(E::id_column(), order);

    let paginator = select.paginate(db, u64::from(query.limit()));
    let total = paginator.num_items().await.map_err(db_err)?;
    let data = paginator
        .fetch_page(u64::from(query.page() - 1))
        .await
        .map_err(db_err)?;

    Ok(PageResponse::new(data, query.page(), query.limit(), total))
}

impl Listable for stock_batches::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "received_at" => Some(stock_batches::Column::ReceivedAt),
            "created_at" => Some(stock_batches::Column::CreatedAt),
            "quantity_remaining" => Some(stock_batches::Column::QuantityRemaining),
            "sell_price_per_unit" => Some(stock_batches::Column::SellPricePerUnit),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        stock_batches::Column::ReceivedAt
    }
}

impl Listable for sales::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![
            sales::Column::CustomerName,
            sales::Column::CustomerEmail,
            sales::Column::CustomerPhone,
        ]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "created_at" => Some(sales::Column::CreatedAt),
            "total_amount" => Some(sales::Column::TotalAmount),
            "customer_name" => Some(sales::Column::CustomerName),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        sales::Column::CreatedAt
    }
}

impl Listable for sale_items::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "created_at" => Some(sale_items::Column::CreatedAt),
            "quantity_sold" => Some(sale_items::Column::QuantitySold),
            "price_at_sale" => Some(sale_items::Column::PriceAtSale),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        sale_items::Column::CreatedAt
    }
}

impl Listable for suppliers::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![suppliers::Column::Name, suppliers::Column::ContactName]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "name" => Some(suppliers::Column::Name),
            "created_at" => Some(suppliers::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        suppliers::Column::Name
    }
}

impl Listable for categories::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![categories::Column::Name]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "name" => Some(categories::Column::Name),
            "created_at" => Some(categories::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        categories::Column::Name
    }
}

impl Listable for manufacturers::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![manufacturers::Column::Name]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "name" => Some(manufacturers::Column::Name),
            "created_at" => Some(manufacturers::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        manufacturers::Column::Name
    }
}

impl Listable for products::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![products::Column::Name, products::Column::Brand]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "name" => Some(products::Column::Name),
            "brand" => Some(products::Column::Brand),
            "created_at" => Some(products::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        products::Column::Name
    }
}

impl Listable for product_variants::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![product_variants::Column::Name, product_variants::Column::Sku]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "name" => Some(product_variants::Column::Name),
            "sku" => Some(product_variants::Column::Sku),
            "created_at" => Some(product_variants::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        product_variants::Column::Sku
    }
}

impl Listable for users::Entity {
    fn search_columns() -> Vec<Self::Column> {
        vec![users::Column::Email, users::Column::FullName]
    }

    fn sort_column(name: &str) -> Option<Self::Column> {
        match name {
            "email" => Some(users::Column::Email),
            "full_name" => Some(users::Column::FullName),
            "created_at" => Some(users::Column::CreatedAt),
            _ => None,
        }
    }

    fn default_sort() -> Self::Column {
        users::Column::Email
    }
}
