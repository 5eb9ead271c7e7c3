//! Storage backends for sellers and product listings.
//!
//! ## Main Components
//!
//! - **traits**: `ProductStore`, `SellerStore` and the combined `Store`
//! - **memory**: In-process backend over a `CatalogIndex`
//! - **sqlite**: SQLite backend with catalog query pushdown
//! - **backend**: `open_store`, picks a backend from settings
//!
//! Both backends answer `list_published` with the same ordered products for
//! the same `CatalogQuery`; `tests/contract.rs` holds them to that.

pub mod backend;
pub mod draft;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use backend::{open_store, Backend, StoreSettings};
pub use draft::{DraftProblem, ProductDraft, SellerListing};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ProductStore, SellerStore, Store};
