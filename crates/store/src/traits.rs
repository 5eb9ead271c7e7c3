//! Storage interfaces shared by every backend.
//!
//! A backend is chosen once at startup and handed around as
//! `Arc<dyn Store>`. Every method is synchronous; async callers run them on a
//! blocking thread.

use crate::draft::{ProductDraft, SellerListing};
use crate::error::Result;
use catalog_data::{
    CatalogSeed, Product, ProductId, Seller, SellerId, SellerProfile, SellerStats, SellerStatus,
};
use query_engine::CatalogQuery;

/// Product listings, both the seller-scoped view and the public catalog.
pub trait ProductStore: Send + Sync {
    /// Create a listing owned by `seller_id`.
    fn create(&self, seller_id: SellerId, draft: ProductDraft) -> Result<Product>;

    /// A seller's own listing, whatever its status.
    fn find(&self, seller_id: SellerId, id: ProductId) -> Result<Option<Product>>;

    /// Replace the editable fields of a seller's own listing.
    fn update(
        &self,
        seller_id: SellerId,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>>;

    fn delete(&self, seller_id: SellerId, id: ProductId) -> Result<bool>;

    /// Delete regardless of owner.
    fn delete_any(&self, id: ProductId) -> Result<bool>;

    /// Published, active products matching `query`, in query order.
    fn list_published(&self, query: &CatalogQuery, limit: Option<usize>) -> Result<Vec<Product>>;

    fn find_published(&self, id: ProductId) -> Result<Option<Product>>;

    /// Published featured products, newest first.
    fn featured(&self, limit: usize) -> Result<Vec<Product>>;

    /// A seller's own listings, most recently updated first.
    fn list_for_seller(&self, seller_id: SellerId, listing: &SellerListing)
        -> Result<Vec<Product>>;

    fn stats(&self, seller_id: SellerId) -> Result<SellerStats>;
}

/// Seller accounts.
pub trait SellerStore: Send + Sync {
    /// Insert a seller. An `id` of 0 is replaced by the next free id.
    /// Duplicate ids, emails or usernames are a `Conflict`.
    fn insert_seller(&self, seller: Seller) -> Result<Seller>;

    fn find_seller(&self, id: SellerId) -> Result<Option<Seller>>;

    fn find_seller_by_email(&self, email: &str) -> Result<Option<Seller>>;

    fn find_seller_by_username(&self, username: &str) -> Result<Option<Seller>>;

    fn update_profile(&self, id: SellerId, profile: SellerProfile) -> Result<Option<Seller>>;

    fn update_status(&self, id: SellerId, status: SellerStatus) -> Result<Option<Seller>>;

    fn make_admin(&self, id: SellerId) -> Result<Option<Seller>>;

    /// Every seller, newest account first.
    fn list_sellers(&self) -> Result<Vec<Seller>>;
}

/// A complete backend.
pub trait Store: ProductStore + SellerStore {
    /// Load sellers and products verbatim, keeping their ids and timestamps.
    fn import(&self, seed: CatalogSeed) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
