//! # Catalog Data Crate
//!
//! Domain types for the marketplace and the in-memory `CatalogIndex`.
//!
//! ## Main Components
//!
//! - **types**: Products, sellers, statuses, and the `CatalogIndex` snapshot
//! - **parser**: Decode JSON seed documents
//! - **index**: Load, index, validate and aggregate catalog data
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog_data::CatalogIndex;
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/catalog.json"))?;
//! let phones = index.get_products_by_category("Phones");
//! let stats = index.seller_stats(1);
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{CatalogDataError, Result};
pub use types::{
    // Type aliases
    ProductId,
    SellerId,
    // Core types
    CatalogIndex,
    CatalogSeed,
    Facet,
    Product,
    Seller,
    SellerProfile,
    SellerRegistration,
    SellerStats,
    // Enums
    ProductStatus,
    SellerRole,
    SellerStatus,
};
