//! Initial database migration.
//!
//! Creates the catalogue, the stock-batch ledger, sales and allocation tables.
//! CHECK constraints back the quantity and price invariants; the UNIQUE
//! constraint on `product_variants.sku` closes the SKU probing race.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(FUNCTIONS_SQL).await?;

        // ============================================================
        // PART 2: PEOPLE & CATALOGUE
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(MANUFACTURERS_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(PRODUCT_VARIANTS_SQL).await?;

        // ============================================================
        // PART 3: STOCK LEDGER
        // ============================================================
        db.execute_unprepared(STOCK_BATCHES_SQL).await?;

        // ============================================================
        // PART 4: SALES & ALLOCATIONS
        // ============================================================
        db.execute_unprepared(SALES_SQL).await?;
        db.execute_unprepared(SALE_ITEMS_SQL).await?;
        db.execute_unprepared(ALLOCATIONS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('viewer', 'cashier', 'manager', 'admin');
";

const FUNCTIONS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'viewer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT users_email_key UNIQUE (email)
);
";

const MANUFACTURERS_SQL: &str = r"
CREATE TABLE manufacturers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    contact_email VARCHAR(255),
    contact_phone VARCHAR(50),
    address TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    contact_name VARCHAR(255),
    contact_email VARCHAR(255),
    contact_phone VARCHAR(50),
    address TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    brand VARCHAR(255),
    description TEXT,
    manufacturer_id UUID REFERENCES manufacturers(id),
    category_id UUID REFERENCES categories(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_products_manufacturer_active
    ON products (manufacturer_id) WHERE deleted_at IS NULL;
";

const PRODUCT_VARIANTS_SQL: &str = r"
CREATE TABLE product_variants (
    id UUID PRIMARY KEY,
    product_id UUID NOT NULL REFERENCES products(id),
    name VARCHAR(255) NOT NULL,
    sku VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT product_variants_sku_key UNIQUE (sku)
);

CREATE INDEX idx_product_variants_product_active
    ON product_variants (product_id) WHERE deleted_at IS NULL;
";

const STOCK_BATCHES_SQL: &str = r"
CREATE TABLE stock_batches (
    id UUID PRIMARY KEY,
    product_variant_id UUID NOT NULL REFERENCES product_variants(id),
    supplier_id UUID REFERENCES suppliers(id),
    quantity_received INTEGER NOT NULL,
    quantity_remaining INTEGER NOT NULL,
    buy_price_per_unit NUMERIC(19, 4) NOT NULL,
    sell_price_per_unit NUMERIC(19, 4) NOT NULL,
    min_sale_price_per_unit NUMERIC(19, 4) NOT NULL,
    received_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_batch_received_positive CHECK (quantity_received > 0),
    CONSTRAINT chk_batch_remaining_bounds
        CHECK (quantity_remaining >= 0 AND quantity_remaining <= quantity_received),
    CONSTRAINT chk_batch_buy_price CHECK (buy_price_per_unit >= 0),
    CONSTRAINT chk_batch_sell_price CHECK (sell_price_per_unit > 0),
    CONSTRAINT chk_batch_min_price
        CHECK (min_sale_price_per_unit > 0 AND min_sale_price_per_unit <= sell_price_per_unit)
);

-- FIFO candidate scan
CREATE INDEX idx_stock_batches_fifo
    ON stock_batches (product_variant_id, received_at, id)
    WHERE deleted_at IS NULL AND quantity_remaining > 0;

CREATE INDEX idx_stock_batches_supplier_active
    ON stock_batches (supplier_id) WHERE deleted_at IS NULL;
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY,
    total_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    customer_name VARCHAR(255),
    customer_phone VARCHAR(50),
    customer_email VARCHAR(255),
    notes TEXT,
    created_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_sale_total_non_negative CHECK (total_amount >= 0)
);
";

const SALE_ITEMS_SQL: &str = r"
CREATE TABLE sale_items (
    id UUID PRIMARY KEY,
    sale_id UUID NOT NULL REFERENCES sales(id),
    product_variant_id UUID NOT NULL REFERENCES product_variants(id),
    quantity_sold INTEGER NOT NULL,
    price_at_sale NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_sale_item_quantity CHECK (quantity_sold > 0),
    CONSTRAINT chk_sale_item_price CHECK (price_at_sale > 0)
);

CREATE INDEX idx_sale_items_sale_active
    ON sale_items (sale_id) WHERE deleted_at IS NULL;
";

const ALLOCATIONS_SQL: &str = r"
CREATE TABLE sale_item_batch_allocations (
    id UUID PRIMARY KEY,
    sale_item_id UUID NOT NULL REFERENCES sale_items(id),
    stock_batch_id UUID NOT NULL REFERENCES stock_batches(id),
    quantity_from_batch INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_allocation_quantity CHECK (quantity_from_batch > 0)
);

CREATE INDEX idx_allocations_sale_item ON sale_item_batch_allocations (sale_item_id);
CREATE INDEX idx_allocations_stock_batch ON sale_item_batch_allocations (stock_batch_id);
";

const TRIGGERS_SQL: &str = r"
CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_manufacturers_updated_at BEFORE UPDATE ON manufacturers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_suppliers_updated_at BEFORE UPDATE ON suppliers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_categories_updated_at BEFORE UPDATE ON categories
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_products_updated_at BEFORE UPDATE ON products
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_product_variants_updated_at BEFORE UPDATE ON product_variants
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_stock_batches_updated_at BEFORE UPDATE ON stock_batches
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_sales_updated_at BEFORE UPDATE ON sales
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_sale_items_updated_at BEFORE UPDATE ON sale_items
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- quantity_received is immutable once the batch exists
CREATE OR REPLACE FUNCTION prevent_received_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.quantity_received <> OLD.quantity_received THEN
        RAISE EXCEPTION 'quantity_received is immutable (batch %)', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_stock_batches_received_immutable BEFORE UPDATE ON stock_batches
    FOR EACH ROW EXECUTE FUNCTION prevent_received_change();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS sale_item_batch_allocations CASCADE;
DROP TABLE IF EXISTS sale_items CASCADE;
DROP TABLE IF EXISTS sales CASCADE;
DROP TABLE IF EXISTS stock_batches CASCADE;
DROP TABLE IF EXISTS product_variants CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP TABLE IF EXISTS manufacturers CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP FUNCTION IF EXISTS prevent_received_change() CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;

DROP TYPE IF EXISTS user_role CASCADE;
";
