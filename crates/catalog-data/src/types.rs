//! Core domain types for the marketplace catalog.
//!
//! Products belong to sellers; the catalog is the published, active subset of
//! all products. Everything here is plain data: no type in this module knows
//! how it is stored or queried.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a product. Ascending ids follow insertion order.
pub type ProductId = u64;

/// Unique identifier for a seller account.
pub type SellerId = u64;

// =============================================================================
// Product-related Types
// =============================================================================

/// Publication state of a listing. Only `Published` listings reach the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Published => "published",
            ProductStatus::Archived => "archived",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "published" => Ok(ProductStatus::Published),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product listing.
///
/// `price` is the current selling price. `original_price` is only used to
/// derive a discount badge and is never filtered on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: SellerId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    /// Aggregate rating from 0.0 to 5.0 in half-point steps
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Unix seconds; absent for listings imported without timestamps
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Visible in the public catalog.
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published && self.is_active
    }
}

// =============================================================================
// Seller-related Types
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerRole {
    #[default]
    Seller,
    Admin,
}

impl SellerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerRole::Seller => "seller",
            SellerRole::Admin => "admin",
        }
    }
}

impl FromStr for SellerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seller" => Ok(SellerRole::Seller),
            "admin" => Ok(SellerRole::Admin),
            other => Err(format!("unknown seller role: {other}")),
        }
    }
}

/// Account state. Suspended sellers keep their data but lose dashboard access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerStatus {
    #[default]
    Pending,
    Active,
    Suspended,
}

impl SellerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerStatus::Pending => "pending",
            SellerStatus::Active => "active",
            SellerStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for SellerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SellerStatus::Pending),
            "active" => Ok(SellerStatus::Active),
            "suspended" => Ok(SellerStatus::Suspended),
            other => Err(format!("unknown seller status: {other}")),
        }
    }
}

/// A seller account. Credentials live with the external auth collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub username: String,
    pub email: String,
    pub business_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: SellerRole,
    #[serde(default)]
    pub status: SellerStatus,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Editable part of a seller's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    pub business_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A new seller account request. The password goes to the external auth
/// collaborator and never reaches this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerRegistration {
    pub username: String,
    pub email: String,
    pub business_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SellerRegistration {
    pub fn profile(&self) -> SellerProfile {
        SellerProfile {
            business_name: self.business_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Listing counts shown on a seller's dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerStats {
    pub total: u64,
    pub published: u64,
    pub drafts: u64,
}

/// One facet value (a category or brand) and how many products carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub value: String,
    pub count: usize,
}

// =============================================================================
// Seed document
// =============================================================================

/// On-disk seed: the sellers and products a store starts with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub sellers: Vec<Seller>,
    #[serde(default)]
    pub products: Vec<Product>,
}

// =============================================================================
// CatalogIndex - In-memory snapshot of sellers and products
// =============================================================================

/// Holds every seller and product plus secondary indices.
///
/// Products live in a `BTreeMap`, so iteration order is ascending id. The
/// query engine treats that order as "input order" when breaking sort ties.
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    pub(crate) products: BTreeMap<ProductId, Product>,
    pub(crate) sellers: BTreeMap<SellerId, Seller>,

    /// Product ids grouped by category
    pub(crate) category_index: BTreeMap<String, Vec<ProductId>>,
    /// Product ids grouped by brand (unbranded products are not indexed)
    pub(crate) brand_index: BTreeMap<String, Vec<ProductId>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn get_seller(&self, id: SellerId) -> Option<&Seller> {
        self.sellers.get(&id)
    }

    pub fn get_seller_mut(&mut self, id: SellerId) -> Option<&mut Seller> {
        self.sellers.get_mut(&id)
    }

    /// All products in ascending id order
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// All sellers in ascending id order
    pub fn sellers(&self) -> impl Iterator<Item = &Seller> {
        self.sellers.values()
    }

    pub fn get_products_by_category(&self, category: &str) -> &[ProductId] {
        self.category_index
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_products_by_brand(&self, brand: &str) -> &[ProductId] {
        self.brand_index
            .get(brand)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Insert or replace a product, keeping the secondary indices current.
    pub fn insert_product(&mut self, product: Product) {
        if self.products.contains_key(&product.id) {
            self.unindex_product(product.id);
        }
        let id = product.id;
        self.category_index
            .entry(product.category.clone())
            .or_default()
            .push(id);
        if let Some(brand) = &product.brand {
            self.brand_index.entry(brand.clone()).or_default().push(id);
        }
        self.products.insert(id, product);
    }

    pub fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        if self.products.contains_key(&id) {
            self.unindex_product(id);
        }
        self.products.remove(&id)
    }

    pub fn insert_seller(&mut self, seller: Seller) {
        self.sellers.insert(seller.id, seller);
    }

    /// Next free product id
    pub fn next_product_id(&self) -> ProductId {
        self.products.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Next free seller id
    pub fn next_seller_id(&self) -> SellerId {
        self.sellers.keys().next_back().map_or(1, |id| id + 1)
    }

    /// (sellers, products)
    pub fn counts(&self) -> (usize, usize) {
        (self.sellers.len(), self.products.len())
    }

    fn unindex_product(&mut self, id: ProductId) {
        let Some(existing) = self.products.get(&id) else {
            return;
        };
        if let Some(ids) = self.category_index.get_mut(&existing.category) {
            ids.retain(|p| *p != id);
            if ids.is_empty() {
                self.category_index.remove(&existing.category);
            }
        }
        if let Some(brand) = &existing.brand {
            if let Some(ids) = self.brand_index.get_mut(brand) {
                ids.retain(|p| *p != id);
                if ids.is_empty() {
                    self.brand_index.remove(brand);
                }
            }
        }
    }
}
