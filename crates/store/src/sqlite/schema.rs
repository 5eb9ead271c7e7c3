//! Table definitions and connection setup.

use query_engine::predicates::contains_ci;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sellers (
    id            INTEGER PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    business_name TEXT NOT NULL,
    phone         TEXT,
    address       TEXT,
    role          TEXT NOT NULL DEFAULT 'seller',
    status        TEXT NOT NULL DEFAULT 'pending',
    verified      INTEGER NOT NULL DEFAULT 0,
    created_at    INTEGER
);

CREATE TABLE IF NOT EXISTS products (
    id             INTEGER PRIMARY KEY,
    seller_id      INTEGER NOT NULL REFERENCES sellers(id) ON DELETE CASCADE,
    name           TEXT NOT NULL,
    category       TEXT NOT NULL,
    brand          TEXT,
    description    TEXT,
    shop_name      TEXT,
    location       TEXT,
    price          REAL NOT NULL,
    original_price REAL,
    rating         REAL NOT NULL DEFAULT 0,
    review_count   INTEGER NOT NULL DEFAULT 0,
    quantity       INTEGER NOT NULL DEFAULT 0,
    image          TEXT,
    status         TEXT NOT NULL DEFAULT 'draft',
    is_featured    INTEGER NOT NULL DEFAULT 0,
    is_active      INTEGER NOT NULL DEFAULT 1,
    created_at     INTEGER,
    updated_at     INTEGER
);

CREATE INDEX IF NOT EXISTS idx_products_seller ON products(seller_id);
CREATE INDEX IF NOT EXISTS idx_products_status ON products(status);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
CREATE INDEX IF NOT EXISTS idx_products_active ON products(is_active);
";

/// Column list matching `product_from_row`.
pub const PRODUCT_COLUMNS: &str = "id, seller_id, name, category, brand, description, shop_name, \
     location, price, original_price, rating, review_count, quantity, image, status, \
     is_featured, is_active, created_at, updated_at";

/// Column list matching `seller_from_row`.
pub const SELLER_COLUMNS: &str =
    "id, username, email, business_name, phone, address, role, status, verified, created_at";

/// Pragmas, the `contains_ci` search function, and the schema.
pub fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.create_scalar_function(
        "contains_ci",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(haystack.is_some_and(|h| contains_ci(&h, &needle)))
        },
    )?;
    conn.execute_batch(SCHEMA)
}
