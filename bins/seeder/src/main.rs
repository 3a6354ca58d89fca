//! Database seeder for Stockwise development and testing.
//!
//! Seeds one user per role, a small catalogue (manufacturer, category,
//! product, variants, supplier) and a few stock batches, then prints bearer
//! tokens for each seeded user.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use stockwise_core::auth::Role;
use stockwise_core::ledger::NewStockBatch;
use stockwise_db::entities::{product_variants, users};
use stockwise_db::repositories::{
    CreateManufacturerInput, CreateProductInput, CreateSupplierInput,
};
use stockwise_db::{
    CategoryRepository, ManufacturerRepository, ProductRepository, StockBatchRepository,
    SupplierRepository, UserRepository,
};
use stockwise_shared::{AppConfig, JwtConfig, JwtService};

const SEED_USERS: [(&str, &str, Role); 4] = [
    ("admin@stockwise.dev", "Ada Admin", Role::Admin),
    ("manager@stockwise.dev", "Morgan Manager", Role::Manager),
    ("cashier@stockwise.dev", "Casey Cashier", Role::Cashier),
    ("viewer@stockwise.dev", "Vic Viewer", Role::Viewer),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = stockwise_db::connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding users...");
    let (users, fresh) = seed_users(&db).await?;

    if fresh {
        println!("Seeding catalogue...");
        let variants = seed_catalogue(&db, config.sku.max_attempts).await?;

        println!("Seeding stock batches...");
        seed_batches(&db, &variants).await?;
    } else {
        println!("  Users already exist, skipping catalogue and stock");
    }

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: 24 * 60,
    });
    println!("Development tokens (valid 24h):");
    for user in &users {
        let role = Role::from(user.role).as_str();
        let token = jwt.generate_access_token(user.id, role)?;
        println!("  {role:<8} {token}");
    }

    println!("Seeding complete!");
    Ok(())
}

/// Creates the role users. Returns them and whether any were new.
async fn seed_users(db: &DatabaseConnection) -> anyhow::Result<(Vec<users::Model>, bool)> {
    let repo = UserRepository::new(db.clone());
    let mut seeded = Vec::with_capacity(SEED_USERS.len());
    let mut fresh = false;

    for (email, name, role) in SEED_USERS {
        if let Some(existing) = repo.find_by_email(email).await? {
            seeded.push(existing);
            continue;
        }
        let user = repo.create(email, name, role).await?;
        println!("  Created {role} user: {email}");
        seeded.push(user);
        fresh = true;
    }

    Ok((seeded, fresh))
}

async fn seed_catalogue(
    db: &DatabaseConnection,
    sku_max_attempts: u32,
) -> anyhow::Result<Vec<product_variants::Model>> {
    let manufacturer = ManufacturerRepository::new(db.clone())
        .create(CreateManufacturerInput {
            name: "Parfums Christian Dior".to_string(),
            contact_email: Some("trade@dior.example".to_string()),
            contact_phone: None,
            address: Some("Paris, France".to_string()),
        })
        .await?;

    let category = CategoryRepository::new(db.clone())
        .create("Fragrance", Some("Perfume and cologne".to_string()))
        .await?;

    let products = ProductRepository::new(db.clone(), sku_max_attempts);
    let product = products
        .create(CreateProductInput {
            name: "Sauvage".to_string(),
            brand: Some("Dior".to_string()),
            description: Some("Eau de toilette".to_string()),
            manufacturer_id: Some(manufacturer.id),
            category_id: Some(category.id),
        })
        .await?;

    let mut variants = Vec::new();
    for name in ["60ml", "100ml"] {
        let variant = products.create_variant(product.id, name).await?;
        println!("  Created variant {} ({})", variant.name, variant.sku);
        variants.push(variant);
    }

    Ok(variants)
}

async fn seed_batches(
    db: &DatabaseConnection,
    variants: &[product_variants::Model],
) -> anyhow::Result<()> {
    let supplier = SupplierRepository::new(db.clone())
        .create(CreateSupplierInput {
            name: "Beauty Wholesale Co".to_string(),
            contact_name: Some("Sam Supplier".to_string()),
            contact_email: Some("orders@beautywholesale.example".to_string()),
            contact_phone: None,
            address: None,
        })
        .await?;

    let batches = StockBatchRepository::new(db.clone());
    let now = Utc::now();
    let mut inserted = 0;

    for variant in variants {
        // An older, cheaper batch and a newer one so FIFO is visible
        for (days_ago, quantity, buy, sell, floor) in
            [(14, 5, 4500, 9900, 8500), (2, 12, 4800, 10500, 9000)]
        {
            batches
                .create(NewStockBatch {
                    product_variant_id: variant.id,
                    supplier_id: Some(supplier.id),
                    quantity_received: quantity,
                    buy_price_per_unit: Decimal::new(buy, 2),
                    sell_price_per_unit: Decimal::new(sell, 2),
                    min_sale_price_per_unit: Decimal::new(floor, 2),
                    received_at: (now - Duration::days(days_ago)).fixed_offset(),
                })
                .await?;
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} stock batches");
    Ok(())
}
