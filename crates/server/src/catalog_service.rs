//! # Catalog Service
//!
//! Coordinates every marketplace operation over one `Store`:
//! 1. Public catalog reads (catalog API, suggestions, featured, details)
//! 2. The seller dashboard, scoped to the session's seller
//! 3. Account registration and operator promotion
//! 4. Admin moderation
//!
//! Store calls are synchronous, so each one runs on the blocking pool under
//! the configured timeout. A failed or timed-out public catalog query is an
//! explicit failure response, never an empty success.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use catalog_data::{
    Product, ProductId, Seller, SellerId, SellerProfile, SellerRegistration, SellerRole,
    SellerStats, SellerStatus,
};
use query_engine::{
    assess_discount, format_currency, CatalogParams, CatalogQuery, DiscountAnomaly,
    DiscountPolicy, FilterPanel, QueryDefaults, StarRating, Suggestion, suggestion_query,
    DEFAULT_PRICE_CEILING, SUGGESTION_LIMIT,
};
use store::{ProductDraft, ProductStore, SellerListing, SellerStore, Store};

use crate::access::{require_admin, require_seller, Session};
use crate::error::{Result, ServiceError};
use crate::latest::{LatestQuery, Outcome};
use crate::validation::{validate_draft, validate_profile, validate_registration, FieldError};

pub const FETCH_FAILED_MESSAGE: &str = "Error fetching products";

/// Tunables for the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Default upper price bound of the storefront filter panel
    pub price_ceiling: f64,
    pub suggestion_limit: usize,
    pub featured_limit: usize,
    pub related_limit: usize,
    pub query_timeout_ms: u64,
    /// Discounts above this percentage are reported as implausible
    pub max_plausible_discount: i64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            price_ceiling: DEFAULT_PRICE_CEILING,
            suggestion_limit: SUGGESTION_LIMIT,
            featured_limit: 8,
            related_limit: 4,
            query_timeout_ms: 2000,
            max_plausible_discount: DiscountPolicy::default().max_plausible_percent,
        }
    }
}

impl CatalogSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn discount_policy(&self) -> DiscountPolicy {
        DiscountPolicy {
            max_plausible_percent: self.max_plausible_discount,
        }
    }
}

/// Body of the public catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CatalogResponse {
    fn failure() -> Self {
        Self {
            success: false,
            products: Vec::new(),
            message: Some(FETCH_FAILED_MESSAGE.to_string()),
        }
    }
}

/// A product with its display derivations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    #[serde(flatten)]
    pub product: Product,
    pub price_label: String,
    pub discount_percent: Option<i64>,
    pub discount_anomaly: Option<DiscountAnomaly>,
    pub stars: StarRating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    pub product: ProductCard,
    /// Other published products in the same category
    pub related: Vec<ProductCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_users: usize,
    pub total_products: usize,
    pub active_users: usize,
    pub pending_users: usize,
}

/// Marketplace operations over a shared store
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, settings: CatalogSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Run one store call on the blocking pool, bounded by the query timeout.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Store) -> store::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        let timeout = self.settings.query_timeout();
        let task = tokio::task::spawn_blocking(move || op(store.as_ref()));

        match tokio::time::timeout(timeout, task).await {
            Err(_) => Err(ServiceError::Timeout(timeout)),
            Ok(Err(join_err)) => Err(ServiceError::Task(join_err.to_string())),
            Ok(Ok(result)) => result.map_err(ServiceError::from),
        }
    }

    // ========================================================================
    // Public catalog
    // ========================================================================

    async fn fetch_catalog(&self, params: CatalogParams) -> Result<Vec<Product>> {
        let start = Instant::now();
        let query = params.into_query(&QueryDefaults::catalog_api());
        let sort = query.sort.clone();

        let products = self
            .run(move |store| store.list_published(&query, None))
            .await?;

        info!(
            "Catalog query returned {} products (sort: {}) in {:.2?}",
            products.len(),
            sort,
            start.elapsed()
        );
        Ok(products)
    }

    /// The catalog API: raw parameters in, ordered published products out.
    pub async fn query_catalog(&self, params: CatalogParams) -> CatalogResponse {
        match self.fetch_catalog(params).await {
            Ok(products) => CatalogResponse {
                success: true,
                products,
                message: None,
            },
            Err(err) => {
                error!("{}: {}", FETCH_FAILED_MESSAGE, err);
                CatalogResponse::failure()
            }
        }
    }

    /// Run a catalog query whose result is rendered into `view` only if no
    /// newer query has been rendered first.
    pub async fn query_into(&self, view: &LatestQuery, params: CatalogParams) -> Outcome {
        let ticket = view.begin();
        let result = self.fetch_catalog(params).await;
        if let Err(err) = &result {
            error!("{}: {}", FETCH_FAILED_MESSAGE, err);
        }
        view.complete(ticket, result)
    }

    /// Inline suggestions for a search box.
    pub async fn suggest(&self, term: &str) -> Result<Vec<Suggestion>> {
        let query = suggestion_query(term);
        if query.search_term().is_none() {
            return Ok(Vec::new());
        }
        let limit = self.settings.suggestion_limit;
        let products = self
            .run(move |store| store.list_published(&query, Some(limit)))
            .await?;
        Ok(products.iter().map(Suggestion::from).collect())
    }

    pub async fn featured(&self) -> Result<Vec<ProductCard>> {
        let limit = self.settings.featured_limit;
        let products = self.run(move |store| store.featured(limit)).await?;
        Ok(products.into_iter().map(|p| self.card(p)).collect())
    }

    pub async fn product_details(&self, id: ProductId) -> Result<Option<ProductDetails>> {
        let Some(product) = self.run(move |store| store.find_published(id)).await? else {
            return Ok(None);
        };

        let limit = self.settings.related_limit;
        let query = CatalogQuery::default().with_category(product.category.clone());
        let mut related = self
            .run(move |store| store.list_published(&query, Some(limit + 1)))
            .await?;
        related.retain(|p| p.id != id);
        related.truncate(limit);

        Ok(Some(ProductDetails {
            product: self.card(product),
            related: related.into_iter().map(|p| self.card(p)).collect(),
        }))
    }

    /// A storefront filter panel over every published product, in id order.
    pub async fn storefront(&self) -> Result<FilterPanel> {
        let mut products = self
            .run(|store| store.list_published(&CatalogQuery::default(), None))
            .await?;
        products.sort_by_key(|p| p.id);
        Ok(FilterPanel::new(
            products,
            QueryDefaults::control_panel(self.settings.price_ceiling),
        ))
    }

    /// Display derivations for one product. Discount anomalies are reported,
    /// the percentage itself is shown as computed.
    pub fn card(&self, product: Product) -> ProductCard {
        let assessment = assess_discount(&product, &self.settings.discount_policy());
        if let Some(anomaly) = assessment.and_then(|a| a.anomaly) {
            warn!(
                "Discount anomaly on product {} ({}): {:?}, price {} vs original {:?}",
                product.id, product.name, anomaly, product.price, product.original_price
            );
        }
        ProductCard {
            price_label: format_currency(product.price),
            discount_percent: assessment.map(|a| a.percent),
            discount_anomaly: assessment.and_then(|a| a.anomaly),
            stars: StarRating::from_rating(product.rating),
            product,
        }
    }

    // ========================================================================
    // Seller dashboard
    // ========================================================================

    pub async fn seller_products(
        &self,
        session: &Session,
        listing: SellerListing,
    ) -> Result<Vec<Product>> {
        let seller_id = require_seller(session)?;
        self.run(move |store| store.list_for_seller(seller_id, &listing))
            .await
    }

    pub async fn seller_stats(&self, session: &Session) -> Result<SellerStats> {
        let seller_id = require_seller(session)?;
        self.run(move |store| store.stats(seller_id)).await
    }

    pub async fn create_product(&self, session: &Session, draft: ProductDraft) -> Result<Product> {
        let seller_id = require_seller(session)?;
        validate_draft(&draft).map_err(ServiceError::Validation)?;

        let product = self
            .run(move |store| store.create(seller_id, draft))
            .await?;
        info!("Seller {} created product {}", seller_id, product.id);
        Ok(product)
    }

    pub async fn get_product(&self, session: &Session, id: ProductId) -> Result<Product> {
        let seller_id = require_seller(session)?;
        self.run(move |store| store.find(seller_id, id))
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    pub async fn update_product(
        &self,
        session: &Session,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product> {
        let seller_id = require_seller(session)?;
        validate_draft(&draft).map_err(ServiceError::Validation)?;

        self.run(move |store| store.update(seller_id, id, draft))
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    pub async fn delete_product(&self, session: &Session, id: ProductId) -> Result<()> {
        let seller_id = require_seller(session)?;
        if self.run(move |store| store.delete(seller_id, id)).await? {
            info!("Seller {} deleted product {}", seller_id, id);
            Ok(())
        } else {
            Err(product_not_found(id))
        }
    }

    pub async fn profile(&self, session: &Session) -> Result<Seller> {
        let seller_id = require_seller(session)?;
        self.run(move |store| store.find_seller(seller_id))
            .await?
            .ok_or_else(|| seller_not_found(seller_id))
    }

    pub async fn update_profile(&self, session: &Session, profile: SellerProfile) -> Result<Seller> {
        let seller_id = require_seller(session)?;
        let profile = validate_profile(profile).map_err(ServiceError::Validation)?;

        self.run(move |store| store.update_profile(seller_id, profile))
            .await?
            .ok_or_else(|| seller_not_found(seller_id))
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Open a pending seller account. Taken usernames and emails are
    /// reported as field errors.
    pub async fn register_seller(&self, registration: SellerRegistration) -> Result<Seller> {
        let registration = validate_registration(registration).map_err(ServiceError::Validation)?;

        let username = registration.username.clone();
        if self
            .run(move |store| store.find_seller_by_username(&username))
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "username",
                "Username already exists",
            )]));
        }
        let email = registration.email.clone();
        if self
            .run(move |store| store.find_seller_by_email(&email))
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(vec![FieldError::new(
                "email",
                "Email already registered",
            )]));
        }

        let seller = Seller {
            id: 0,
            username: registration.username,
            email: registration.email,
            business_name: registration.business_name,
            phone: registration.phone,
            address: registration.address,
            role: SellerRole::Seller,
            status: SellerStatus::Pending,
            verified: false,
            created_at: None,
        };
        let seller = self.run(move |store| store.insert_seller(seller)).await?;
        info!("Registered seller {} ({})", seller.id, seller.username);
        Ok(seller)
    }

    /// Give the account with `email` the admin role. Operator-only, so no
    /// session is checked.
    pub async fn promote_admin(&self, email: &str) -> Result<Seller> {
        let email = email.trim().to_lowercase();
        let lookup = email.clone();
        let seller = self
            .run(move |store| store.find_seller_by_email(&lookup))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Seller with email {email}")))?;

        let id = seller.id;
        let seller = self
            .run(move |store| store.make_admin(id))
            .await?
            .ok_or_else(|| seller_not_found(id))?;
        info!("Promoted seller {} to admin", seller.id);
        Ok(seller)
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn list_sellers(&self, session: &Session) -> Result<Vec<Seller>> {
        require_admin(session)?;
        self.run(|store| store.list_sellers()).await
    }

    async fn set_seller_status(
        &self,
        session: &Session,
        id: SellerId,
        status: SellerStatus,
    ) -> Result<Seller> {
        let admin_id = require_admin(session)?;
        let seller = self
            .run(move |store| store.update_status(id, status))
            .await?
            .ok_or_else(|| seller_not_found(id))?;
        info!("Admin {} set seller {} to {}", admin_id, id, status.as_str());
        Ok(seller)
    }

    pub async fn suspend_seller(&self, session: &Session, id: SellerId) -> Result<Seller> {
        self.set_seller_status(session, id, SellerStatus::Suspended)
            .await
    }

    /// Approve a pending seller or lift a suspension.
    pub async fn activate_seller(&self, session: &Session, id: SellerId) -> Result<Seller> {
        self.set_seller_status(session, id, SellerStatus::Active).await
    }

    pub async fn admin_delete_product(&self, session: &Session, id: ProductId) -> Result<()> {
        let admin_id = require_admin(session)?;
        if self.run(move |store| store.delete_any(id)).await? {
            info!("Admin {} deleted product {}", admin_id, id);
            Ok(())
        } else {
            Err(product_not_found(id))
        }
    }

    pub async fn admin_overview(&self, session: &Session) -> Result<AdminOverview> {
        require_admin(session)?;
        let (sellers, products) = tokio::try_join!(
            self.run(|store| store.list_sellers()),
            self.run(|store| store.list_published(&CatalogQuery::default(), None)),
        )?;

        let with_status =
            |status: SellerStatus| sellers.iter().filter(|s| s.status == status).count();
        Ok(AdminOverview {
            total_users: sellers.len(),
            total_products: products.len(),
            active_users: with_status(SellerStatus::Active),
            pending_users: with_status(SellerStatus::Pending),
        })
    }
}

fn product_not_found(id: ProductId) -> ServiceError {
    ServiceError::NotFound(format!("Product {id}"))
}

fn seller_not_found(id: SellerId) -> ServiceError {
    ServiceError::NotFound(format!("Seller {id}"))
}
