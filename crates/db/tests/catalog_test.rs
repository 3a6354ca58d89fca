//! Integration tests for SKU generation, catalog lifecycle and listing.

mod common;

use futures::future::join_all;
use rust_decimal_macros::dec;
use stockwise_core::StockError;
use stockwise_core::auth::Role;
use stockwise_core::ledger::NewStockBatch;
use stockwise_db::repositories::{CreateProductInput, CreateSupplierInput};
use stockwise_db::{ProductRepository, StockBatchRepository, SupplierRepository, UserRepository};
use stockwise_shared::types::{ListQuery, SortOrder};

use common::{connect, tag, ts};

const SKU_ATTEMPTS: u32 = 16;

fn product_input(brand: &str, name: &str) -> CreateProductInput {
    CreateProductInput {
        name: name.to_string(),
        brand: Some(brand.to_string()),
        description: None,
        manufacturer_id: None,
        category_id: None,
    }
}

#[tokio::test]
async fn test_sku_collision_appends_suffix() {
    let Some(db) = connect().await else { return };
    let products = ProductRepository::new(db.clone(), SKU_ATTEMPTS);
    let brand = format!("Dior{}", tag());
    let base = format!("{}-SAUVAGE", brand.to_uppercase());

    let first_product = products
        .create(product_input(&brand, "Sauvage"))
        .await
        .expect("create product");
    let second_product = products
        .create(product_input(&brand, "Sauvage"))
        .await
        .expect("create product");

    let first = products
        .create_variant(first_product.id, "")
        .await
        .expect("first variant");
    let second = products
        .create_variant(second_product.id, "  ")
        .await
        .expect("second variant");

    assert_eq!(first.sku, base);
    assert_eq!(second.sku, format!("{base}-1"));
}

#[tokio::test]
async fn test_deleted_variant_keeps_its_sku() {
    let Some(db) = connect().await else { return };
    let products = ProductRepository::new(db.clone(), SKU_ATTEMPTS);
    let product = products
        .create(product_input(&format!("Brand{}", tag()), "Eau"))
        .await
        .expect("create product");

    let first = products
        .create_variant(product.id, "50 ml")
        .await
        .expect("first variant");
    products
        .delete_variant(first.id)
        .await
        .expect("delete variant");

    let second = products
        .create_variant(product.id, "50 ml")
        .await
        .expect("second variant");
    assert_eq!(second.sku, format!("{}-1", first.sku));
}

#[tokio::test]
async fn test_concurrent_variants_get_distinct_skus() {
    let Some(db) = connect().await else { return };
    let products = ProductRepository::new(db.clone(), SKU_ATTEMPTS);
    let product = products
        .create(product_input(&format!("Race{}", tag()), "Oud"))
        .await
        .expect("create product");

    let handles = (0..5).map(|_| {
        let products = products.clone();
        let product_id = product.id;
        tokio::spawn(async move { products.create_variant(product_id, "Intense").await })
    });

    let mut skus: Vec<String> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("task panicked").expect("variant created").sku)
        .collect();
    skus.sort();
    skus.dedup();
    assert_eq!(skus.len(), 5);
}

#[tokio::test]
async fn test_variant_on_deleted_product_is_not_found() {
    let Some(db) = connect().await else { return };
    let products = ProductRepository::new(db.clone(), SKU_ATTEMPTS);
    let product = products
        .create(product_input("Acme", &format!("Gone {}", tag())))
        .await
        .expect("create product");
    products.delete(product.id).await.expect("delete product");

    let err = products
        .create_variant(product.id, "Mini")
        .await
        .expect_err("deleted product");
    assert!(matches!(err, StockError::NotFound { .. }));
}

#[tokio::test]
async fn test_supplier_delete_blocked_by_active_batch() {
    let Some(db) = connect().await else { return };
    let suppliers = SupplierRepository::new(db.clone());
    let supplier = suppliers
        .create(CreateSupplierInput {
            name: format!("Supplier {}", tag()),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            address: None,
        })
        .await
        .expect("create supplier");

    let variant = common::create_variant(&db).await;
    let batches = StockBatchRepository::new(db.clone());
    let batch = batches
        .create(NewStockBatch {
            product_variant_id: variant.id,
            supplier_id: Some(supplier.id),
            quantity_received: 4,
            buy_price_per_unit: dec!(3.00),
            sell_price_per_unit: dec!(9.00),
            min_sale_price_per_unit: dec!(7.00),
            received_at: ts("2026-09-01T09:00:00Z"),
        })
        .await
        .expect("create batch");

    let err = suppliers
        .delete(supplier.id)
        .await
        .expect_err("supplier has an active batch");
    assert!(matches!(err, StockError::HasActiveDependents { .. }));

    batches.delete(batch.id).await.expect("delete batch");
    suppliers
        .delete(supplier.id)
        .await
        .expect("supplier delete should now succeed");

    // Batches cannot attach to a deleted supplier
    let err = batches
        .create(NewStockBatch {
            product_variant_id: variant.id,
            supplier_id: Some(supplier.id),
            quantity_received: 1,
            buy_price_per_unit: dec!(3.00),
            sell_price_per_unit: dec!(9.00),
            min_sale_price_per_unit: dec!(7.00),
            received_at: ts("2026-09-02T09:00:00Z"),
        })
        .await
        .expect_err("deleted supplier");
    assert!(matches!(err, StockError::NotFound { .. }));
}

#[tokio::test]
async fn test_user_email_is_unique() {
    let Some(db) = connect().await else { return };
    let users = UserRepository::new(db.clone());
    let email = format!("cashier-{}@example.com", tag().to_lowercase());

    let user = users
        .create(&email, "Test Cashier", Role::Cashier)
        .await
        .expect("create user");
    assert_eq!(Role::from(user.role), Role::Cashier);

    let err = users
        .create(&email.to_uppercase(), "Duplicate", Role::Viewer)
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, StockError::Conflict(_)));
}

#[tokio::test]
async fn test_list_search_and_include_deleted() {
    let Some(db) = connect().await else { return };
    let suppliers = SupplierRepository::new(db.clone());
    let marker = tag();

    let mut ids = Vec::new();
    for name in ["Alpha", "Beta", "Gamma"] {
        let supplier = suppliers
            .create(CreateSupplierInput {
                name: format!("{name} {marker}"),
                contact_name: None,
                contact_email: None,
                contact_phone: None,
                address: None,
            })
            .await
            .expect("create supplier");
        ids.push(supplier.id);
    }
    suppliers.delete(ids[1]).await.expect("delete supplier");

    let query = ListQuery {
        search: Some(marker.to_lowercase()),
        sort: Some("name".to_string()),
        order: SortOrder::Asc,
        ..ListQuery::default()
    };
    let page = suppliers.list(&query).await.expect("list suppliers");
    let names: Vec<_> = page.data.iter().map(|s| s.name.clone()).collect();
    assert_eq!(
        names,
        vec![format!("Alpha {marker}"), format!("Gamma {marker}")]
    );

    let page = suppliers
        .list(&ListQuery {
            include_deleted: true,
            ..query.clone()
        })
        .await
        .expect("list suppliers");
    assert_eq!(page.meta.total, 3);

    let err = suppliers
        .list(&ListQuery {
            sort: Some("contact_phone; DROP".to_string()),
            ..query
        })
        .await
        .expect_err("unknown sort column");
    assert!(matches!(err, StockError::Validation(_)));
}

#[tokio::test]
async fn test_restore_requires_active_parent() {
    let Some(db) = connect().await else { return };
    let products = ProductRepository::new(db.clone(), SKU_ATTEMPTS);
    let batches = StockBatchRepository::new(db.clone());
    let product = products
        .create(product_input("Acme", &format!("Orphan {}", tag())))
        .await
        .expect("create product");
    let variant = products
        .create_variant(product.id, "50ml")
        .await
        .expect("create variant");
    let batch = batches
        .create(NewStockBatch {
            product_variant_id: variant.id,
            supplier_id: None,
            quantity_received: 2,
            buy_price_per_unit: dec!(1.00),
            sell_price_per_unit: dec!(2.00),
            min_sale_price_per_unit: dec!(1.50),
            received_at: ts("2026-10-01T09:00:00Z"),
        })
        .await
        .expect("create batch");

    batches.delete(batch.id).await.expect("delete batch");
    products.delete_variant(variant.id).await.expect("delete variant");
    products.delete(product.id).await.expect("delete product");

    let err = batches
        .restore(batch.id)
        .await
        .expect_err("variant is deleted");
    assert!(err.is_state_error());
    let err = products
        .restore_variant(variant.id)
        .await
        .expect_err("product is deleted");
    assert!(err.is_state_error());

    products.restore(product.id).await.expect("restore product");
    products
        .restore_variant(variant.id)
        .await
        .expect("restore variant");
    let restored = batches.restore(batch.id).await.expect("restore batch");
    assert!(restored.deleted_at.is_none());
}
