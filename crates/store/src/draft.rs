//! Seller-editable product fields and seller listing filters.

use crate::error::StoreError;
use catalog_data::{Product, ProductStatus};
use query_engine::predicates::contains_ci;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Product fields a seller may set. Everything else (id, owner, rating,
/// review count, timestamps) is owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the seller's business name
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One failed draft check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftProblem {
    pub field: &'static str,
    pub message: String,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            brand: None,
            description: None,
            shop_name: None,
            location: None,
            price,
            original_price: None,
            quantity: 0,
            image: None,
            status: ProductStatus::Draft,
            is_featured: false,
            is_active: true,
        }
    }

    /// Every problem with the draft; empty when it can be stored.
    pub fn validate(&self) -> Vec<DraftProblem> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(DraftProblem {
                field: "name",
                message: "Product name is required".to_string(),
            });
        }
        if self.category.trim().is_empty() {
            problems.push(DraftProblem {
                field: "category",
                message: "Category is required".to_string(),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            problems.push(DraftProblem {
                field: "price",
                message: "Price must be a non-negative number".to_string(),
            });
        }
        if let Some(original) = self.original_price {
            if !original.is_finite() || original < 0.0 {
                problems.push(DraftProblem {
                    field: "originalPrice",
                    message: "Original price must be a non-negative number".to_string(),
                });
            }
        }
        problems
    }

    /// `validate`, folded into a store error.
    pub(crate) fn ensure_valid(&self) -> Result<(), StoreError> {
        let problems = self.validate();
        if problems.is_empty() {
            return Ok(());
        }
        let message = problems
            .iter()
            .map(|p| format!("{}: {}", p.field, p.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(StoreError::Invalid(message))
    }

    /// Copy the draft onto a product, keeping store-owned fields.
    pub(crate) fn apply_to(&self, product: &mut Product, default_shop: &str) {
        product.name = self.name.trim().to_string();
        product.category = self.category.trim().to_string();
        product.brand = self.brand.clone();
        product.description = self.description.clone();
        product.shop_name = Some(
            self.shop_name
                .clone()
                .unwrap_or_else(|| default_shop.to_string()),
        );
        product.location = self.location.clone();
        product.price = self.price;
        product.original_price = self.original_price;
        product.quantity = self.quantity;
        product.image = self.image.clone();
        product.status = self.status;
        product.is_featured = self.is_featured;
        product.is_active = self.is_active;
    }
}

/// Filters for a seller's own listing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerListing {
    /// `None` lists every status
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub search: Option<String>,
}

impl SellerListing {
    /// Parse the dashboard's `status` parameter, where `all` means no filter.
    pub fn from_params(status: Option<&str>, search: Option<String>) -> Self {
        let status = status
            .filter(|s| !s.is_empty() && *s != "all")
            .and_then(|s| s.parse().ok());
        Self { status, search }
    }

    /// Trimmed, lowercased search term.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.status.is_some_and(|status| product.status != status) {
            return false;
        }
        match self.search_term() {
            None => true,
            Some(term) => {
                contains_ci(&product.name, &term)
                    || contains_ci(&product.category, &term)
                    || product
                        .shop_name
                        .as_deref()
                        .is_some_and(|shop| contains_ci(shop, &term))
            }
        }
    }
}

/// Seller listing order: most recently updated first, then newest id.
pub(crate) fn recently_updated(a: &Product, b: &Product) -> Ordering {
    match (a.updated_at, b.updated_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.id.cmp(&a.id))
}
