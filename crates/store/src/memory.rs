//! In-process backend: a `CatalogIndex` behind a lock.
//!
//! Catalog queries run through `query_engine::apply_limited` over a snapshot
//! of the published products in id order.

use crate::draft::{recently_updated, ProductDraft, SellerListing};
use crate::error::{Result, StoreError};
use crate::traits::{ProductStore, SellerStore, Store};
use catalog_data::{
    CatalogIndex, CatalogSeed, Product, ProductId, ProductStatus, Seller, SellerId, SellerProfile,
    SellerRole, SellerStats, SellerStatus,
};
use query_engine::{sort, CatalogQuery, SortKey};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

pub struct MemoryStore {
    index: RwLock<CatalogIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_index(CatalogIndex::new())
    }

    pub fn from_index(index: CatalogIndex) -> Self {
        Self {
            index: RwLock::new(index),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogIndex>> {
        self.index.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogIndex>> {
        self.index.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Published products in id order.
    fn published_snapshot(&self) -> Result<Vec<Product>> {
        let index = self.read()?;
        Ok(index
            .products()
            .filter(|p| p.is_published())
            .cloned()
            .collect())
    }

    fn modify_seller(
        &self,
        id: SellerId,
        change: impl FnOnce(&mut Seller),
    ) -> Result<Option<Seller>> {
        let mut index = self.write()?;
        Ok(index.get_seller_mut(id).map(|seller| {
            change(seller);
            seller.clone()
        }))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl ProductStore for MemoryStore {
    fn create(&self, seller_id: SellerId, draft: ProductDraft) -> Result<Product> {
        draft.ensure_valid()?;
        let mut index = self.write()?;
        let shop = index
            .get_seller(seller_id)
            .map(|s| s.business_name.clone())
            .ok_or_else(|| StoreError::Invalid(format!("seller {seller_id} does not exist")))?;

        let timestamp = now();
        let mut product = Product {
            id: index.next_product_id(),
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
            status: ProductStatus::Draft,
            is_featured: false,
            is_active: true,
            created_at: Some(timestamp),
            updated_at: Some(timestamp),
        };
        draft.apply_to(&mut product, &shop);

        debug!("Created product {} for seller {}", product.id, seller_id);
        index.insert_product(product.clone());
        Ok(product)
    }

    fn find(&self, seller_id: SellerId, id: ProductId) -> Result<Option<Product>> {
        let index = self.read()?;
        Ok(index
            .get_product(id)
            .filter(|p| p.seller_id == seller_id)
            .cloned())
    }

    fn update(
        &self,
        seller_id: SellerId,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>> {
        draft.ensure_valid()?;
        let mut index = self.write()?;
        let Some(mut product) = index
            .get_product(id)
            .filter(|p| p.seller_id == seller_id)
            .cloned()
        else {
            return Ok(None);
        };
        let shop = index
            .get_seller(seller_id)
            .map(|s| s.business_name.clone())
            .unwrap_or_default();

        draft.apply_to(&mut product, &shop);
        product.updated_at = Some(now());
        index.insert_product(product.clone());
        Ok(Some(product))
    }

    fn delete(&self, seller_id: SellerId, id: ProductId) -> Result<bool> {
        let mut index = self.write()?;
        let owned = index
            .get_product(id)
            .is_some_and(|p| p.seller_id == seller_id);
        Ok(owned && index.remove_product(id).is_some())
    }

    fn delete_any(&self, id: ProductId) -> Result<bool> {
        let mut index = self.write()?;
        Ok(index.remove_product(id).is_some())
    }

    fn list_published(&self, query: &CatalogQuery, limit: Option<usize>) -> Result<Vec<Product>> {
        let snapshot = self.published_snapshot()?;
        Ok(query_engine::apply_limited(&snapshot, query, limit))
    }

    fn find_published(&self, id: ProductId) -> Result<Option<Product>> {
        let index = self.read()?;
        Ok(index.get_product(id).filter(|p| p.is_published()).cloned())
    }

    fn featured(&self, limit: usize) -> Result<Vec<Product>> {
        let mut featured: Vec<Product> = self
            .published_snapshot()?
            .into_iter()
            .filter(|p| p.is_featured)
            .collect();
        sort::sort_products(&mut featured, &SortKey::Featured);
        featured.truncate(limit);
        Ok(featured)
    }

    fn list_for_seller(
        &self,
        seller_id: SellerId,
        listing: &SellerListing,
    ) -> Result<Vec<Product>> {
        let index = self.read()?;
        let mut products: Vec<Product> = index
            .products()
            .filter(|p| p.seller_id == seller_id && listing.matches(p))
            .cloned()
            .collect();
        products.sort_by(recently_updated);
        Ok(products)
    }

    fn stats(&self, seller_id: SellerId) -> Result<SellerStats> {
        Ok(self.read()?.seller_stats(seller_id))
    }
}

impl SellerStore for MemoryStore {
    fn insert_seller(&self, mut seller: Seller) -> Result<Seller> {
        let mut index = self.write()?;
        if seller.id == 0 {
            seller.id = index.next_seller_id();
        } else if index.get_seller(seller.id).is_some() {
            return Err(StoreError::Conflict(format!("seller {} already exists", seller.id)));
        }
        if index.sellers().any(|s| s.email == seller.email) {
            return Err(StoreError::Conflict(format!("email {} is taken", seller.email)));
        }
        if index.sellers().any(|s| s.username == seller.username) {
            return Err(StoreError::Conflict(format!(
                "username {} is taken",
                seller.username
            )));
        }
        if seller.created_at.is_none() {
            seller.created_at = Some(now());
        }
        index.insert_seller(seller.clone());
        Ok(seller)
    }

    fn find_seller(&self, id: SellerId) -> Result<Option<Seller>> {
        Ok(self.read()?.get_seller(id).cloned())
    }

    fn find_seller_by_email(&self, email: &str) -> Result<Option<Seller>> {
        Ok(self.read()?.sellers().find(|s| s.email == email).cloned())
    }

    fn find_seller_by_username(&self, username: &str) -> Result<Option<Seller>> {
        Ok(self
            .read()?
            .sellers()
            .find(|s| s.username == username)
            .cloned())
    }

    fn update_profile(&self, id: SellerId, profile: SellerProfile) -> Result<Option<Seller>> {
        self.modify_seller(id, |seller| {
            seller.business_name = profile.business_name;
            seller.phone = profile.phone;
            seller.address = profile.address;
        })
    }

    fn update_status(&self, id: SellerId, status: SellerStatus) -> Result<Option<Seller>> {
        self.modify_seller(id, |seller| seller.status = status)
    }

    fn make_admin(&self, id: SellerId) -> Result<Option<Seller>> {
        self.modify_seller(id, |seller| seller.role = SellerRole::Admin)
    }

    fn list_sellers(&self) -> Result<Vec<Seller>> {
        let mut sellers: Vec<Seller> = self.read()?.sellers().cloned().collect();
        sellers.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });
        Ok(sellers)
    }
}

impl Store for MemoryStore {
    fn import(&self, seed: CatalogSeed) -> Result<()> {
        let incoming = CatalogIndex::from_seed(seed)?;
        let mut index = self.write()?;
        for seller in incoming.sellers() {
            index.insert_seller(seller.clone());
        }
        for product in incoming.products() {
            index.insert_product(product.clone());
        }
        let (sellers, products) = incoming.counts();
        info!("Imported {} sellers and {} products into memory store", sellers, products);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
