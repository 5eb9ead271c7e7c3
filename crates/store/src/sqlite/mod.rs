//! SQLite backend. Catalog queries are lowered to SQL and evaluated by the
//! database instead of in process.

pub mod schema;
pub mod sql;

use crate::draft::{ProductDraft, SellerListing};
use crate::error::{Result, StoreError};
use crate::memory::now;
use crate::traits::{ProductStore, SellerStore, Store};
use catalog_data::{
    CatalogIndex, CatalogSeed, Product, ProductId, Seller, SellerId, SellerProfile, SellerRole,
    SellerStats, SellerStatus,
};
use query_engine::CatalogQuery;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use schema::{PRODUCT_COLUMNS, SELLER_COLUMNS};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};

const PUBLISHED: &str = "status = 'published' AND is_active = 1";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening SQLite store at {:?}", path);
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory database, for tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut *conn)
    }

    fn query_products(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Product>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, product_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn find_product(conn: &Connection, seller_id: SellerId, id: ProductId) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND seller_id = ?2");
        Ok(conn
            .prepare_cached(&sql)?
            .query_row(params![id, seller_id], product_from_row)
            .optional()?)
    }

    fn find_seller_where(&self, column: &str, value: Value) -> Result<Option<Seller>> {
        let sql = format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE {column} = ?1");
        self.with_conn(|conn| {
            Ok(conn
                .prepare_cached(&sql)?
                .query_row(params![value], seller_from_row)
                .optional()?)
        })
    }

    fn update_seller_column(&self, id: SellerId, column: &str, value: &str) -> Result<Option<Seller>> {
        let sql = format!("UPDATE sellers SET {column} = ?1 WHERE id = ?2");
        let changed = self.with_conn(|conn| Ok(conn.execute(&sql, params![value, id])?))?;
        if changed == 0 {
            return Ok(None);
        }
        self.find_seller(id)
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn parse_column<T: FromStr<Err = String>>(idx: usize, raw: String) -> rusqlite::Result<T> {
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        seller_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        brand: row.get(4)?,
        description: row.get(5)?,
        shop_name: row.get(6)?,
        location: row.get(7)?,
        price: row.get(8)?,
        original_price: row.get(9)?,
        rating: row.get::<_, f64>(10)? as f32,
        review_count: row.get(11)?,
        quantity: row.get(12)?,
        image: row.get(13)?,
        status: parse_column(14, row.get(14)?)?,
        is_featured: row.get(15)?,
        is_active: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn seller_from_row(row: &Row<'_>) -> rusqlite::Result<Seller> {
    Ok(Seller {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        business_name: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        role: parse_column(6, row.get(6)?)?,
        status: parse_column(7, row.get(7)?)?,
        verified: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn insert_product(conn: &Connection, product: &Product) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT OR REPLACE INTO products ({PRODUCT_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
    );
    conn.prepare_cached(&sql)?.execute(params![
        product.id,
        product.seller_id,
        product.name,
        product.category,
        product.brand,
        product.description,
        product.shop_name,
        product.location,
        product.price,
        product.original_price,
        f64::from(product.rating),
        product.review_count,
        product.quantity,
        product.image,
        product.status.as_str(),
        product.is_featured,
        product.is_active,
        product.created_at,
        product.updated_at,
    ])?;
    Ok(())
}

fn insert_seller_row(conn: &Connection, seller: &Seller) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT INTO sellers ({SELLER_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             username = excluded.username,
             email = excluded.email,
             business_name = excluded.business_name,
             phone = excluded.phone,
             address = excluded.address,
             role = excluded.role,
             status = excluded.status,
             verified = excluded.verified,
             created_at = excluded.created_at"
    );
    conn.prepare_cached(&sql)?.execute(params![
        seller.id,
        seller.username,
        seller.email,
        seller.business_name,
        seller.phone,
        seller.address,
        seller.role.as_str(),
        seller.status.as_str(),
        seller.verified,
        seller.created_at,
    ])?;
    Ok(())
}

// =============================================================================
// ProductStore
// =============================================================================

impl ProductStore for SqliteStore {
    fn create(&self, seller_id: SellerId, draft: ProductDraft) -> Result<Product> {
        draft.ensure_valid()?;
        let shop = self
            .find_seller(seller_id)?
            .map(|s| s.business_name)
            .ok_or_else(|| StoreError::Invalid(format!("seller {seller_id} does not exist")))?;

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let next_id: ProductId =
                tx.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM products", [], |row| {
                    row.get(0)
                })?;

            let timestamp = now();
            let mut product = Product {
                id: next_id,
                seller_id,
                name: String::new(),
                category: String::new(),
                brand: None,
                description: None,
                shop_name: None,
                location: None,
                price: 0.0,
                original_price: None,
                rating: 0.0,
                review_count: 0,
                quantity: 0,
                image: None,
                status: Default::default(),
                is_featured: false,
                is_active: true,
                created_at: Some(timestamp),
                updated_at: Some(timestamp),
            };
            draft.apply_to(&mut product, &shop);
            insert_product(&tx, &product)?;
            tx.commit()?;

            debug!("Created product {} for seller {}", product.id, seller_id);
            Ok(product)
        })
    }

    fn find(&self, seller_id: SellerId, id: ProductId) -> Result<Option<Product>> {
        self.with_conn(|conn| Self::find_product(conn, seller_id, id))
    }

    fn update(
        &self,
        seller_id: SellerId,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>> {
        draft.ensure_valid()?;
        let shop = self
            .find_seller(seller_id)?
            .map(|s| s.business_name)
            .unwrap_or_default();

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let Some(mut product) = Self::find_product(&tx, seller_id, id)? else {
                return Ok(None);
            };
            draft.apply_to(&mut product, &shop);
            product.updated_at = Some(now());
            insert_product(&tx, &product)?;
            tx.commit()?;
            Ok(Some(product))
        })
    }

    fn delete(&self, seller_id: SellerId, id: ProductId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM products WHERE id = ?1 AND seller_id = ?2",
                params![id, seller_id],
            )?;
            Ok(deleted > 0)
        })
    }

    fn delete_any(&self, id: ProductId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }

    fn list_published(&self, query: &CatalogQuery, limit: Option<usize>) -> Result<Vec<Product>> {
        let sql::LoweredQuery {
            where_clause,
            order_by,
            mut params,
        } = sql::lower(query);

        let mut statement = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PUBLISHED} AND {where_clause} ORDER BY {order_by}"
        );
        if let Some(limit) = limit {
            statement.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }
        debug!("Catalog query: {}", statement);

        self.with_conn(|conn| Self::query_products(conn, &statement, params_from_iter(params)))
    }

    fn find_published(&self, id: ProductId) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND {PUBLISHED}");
        self.with_conn(|conn| {
            Ok(conn
                .prepare_cached(&sql)?
                .query_row(params![id], product_from_row)
                .optional()?)
        })
    }

    fn featured(&self, limit: usize) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PUBLISHED} AND is_featured = 1
             ORDER BY created_at DESC NULLS LAST, id ASC LIMIT ?1"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| Self::query_products(conn, &sql, params![limit]))
    }

    fn list_for_seller(
        &self,
        seller_id: SellerId,
        listing: &SellerListing,
    ) -> Result<Vec<Product>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = ?");
        let mut params = vec![Value::Integer(seller_id as i64)];

        if let Some(status) = listing.status {
            sql.push_str(" AND status = ?");
            params.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(term) = listing.search_term() {
            sql.push_str(
                " AND (contains_ci(name, ?) OR contains_ci(category, ?) OR contains_ci(shop_name, ?))",
            );
            for _ in 0..3 {
                params.push(Value::Text(term.clone()));
            }
        }
        sql.push_str(" ORDER BY updated_at DESC NULLS LAST, id DESC");

        self.with_conn(|conn| Self::query_products(conn, &sql, params_from_iter(params)))
    }

    fn stats(&self, seller_id: SellerId) -> Result<SellerStats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'published'), 0),
                        COALESCE(SUM(status = 'draft'), 0)
                 FROM products WHERE seller_id = ?1",
                params![seller_id],
                |row| {
                    Ok(SellerStats {
                        total: row.get(0)?,
                        published: row.get(1)?,
                        drafts: row.get(2)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }
}

// =============================================================================
// SellerStore
// =============================================================================

impl SellerStore for SqliteStore {
    fn insert_seller(&self, mut seller: Seller) -> Result<Seller> {
        if seller.id != 0 && self.find_seller(seller.id)?.is_some() {
            return Err(StoreError::Conflict(format!("seller {} already exists", seller.id)));
        }
        if self.find_seller_by_email(&seller.email)?.is_some() {
            return Err(StoreError::Conflict(format!("email {} is taken", seller.email)));
        }
        if self.find_seller_by_username(&seller.username)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "username {} is taken",
                seller.username
            )));
        }
        if seller.created_at.is_none() {
            seller.created_at = Some(now());
        }

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            if seller.id == 0 {
                seller.id = tx.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM sellers", [], |row| {
                    row.get(0)
                })?;
            }
            insert_seller_row(&tx, &seller)?;
            tx.commit()?;
            Ok(seller)
        })
    }

    fn find_seller(&self, id: SellerId) -> Result<Option<Seller>> {
        self.find_seller_where("id", Value::Integer(id as i64))
    }

    fn find_seller_by_email(&self, email: &str) -> Result<Option<Seller>> {
        self.find_seller_where("email", Value::Text(email.to_string()))
    }

    fn find_seller_by_username(&self, username: &str) -> Result<Option<Seller>> {
        self.find_seller_where("username", Value::Text(username.to_string()))
    }

    fn update_profile(&self, id: SellerId, profile: SellerProfile) -> Result<Option<Seller>> {
        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE sellers SET business_name = ?1, phone = ?2, address = ?3 WHERE id = ?4",
                params![profile.business_name, profile.phone, profile.address, id],
            )?)
        })?;
        if changed == 0 {
            return Ok(None);
        }
        self.find_seller(id)
    }

    fn update_status(&self, id: SellerId, status: SellerStatus) -> Result<Option<Seller>> {
        self.update_seller_column(id, "status", status.as_str())
    }

    fn make_admin(&self, id: SellerId) -> Result<Option<Seller>> {
        self.update_seller_column(id, "role", SellerRole::Admin.as_str())
    }

    fn list_sellers(&self) -> Result<Vec<Seller>> {
        let sql = format!(
            "SELECT {SELLER_COLUMNS} FROM sellers ORDER BY created_at DESC NULLS LAST, id DESC"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map([], seller_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

impl Store for SqliteStore {
    fn import(&self, seed: CatalogSeed) -> Result<()> {
        let incoming = CatalogIndex::from_seed(seed)?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for seller in incoming.sellers() {
                insert_seller_row(&tx, seller)?;
            }
            for product in incoming.products() {
                insert_product(&tx, product)?;
            }
            tx.commit()?;
            Ok(())
        })?;

        let (sellers, products) = incoming.counts();
        info!("Imported {} sellers and {} products into SQLite store", sellers, products);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
