//! The catalog query: one immutable value describing which products are
//! visible and in what order.
//!
//! Both adapters consume the same `CatalogQuery`: the in-process evaluator in
//! [`crate::engine`] and the SQL lowering in the store crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Price ceiling used by the storefront control panel.
pub const DEFAULT_PRICE_CEILING: f64 = 2000.0;

// =============================================================================
// SortKey
// =============================================================================

/// Ordering applied to the filtered products.
///
/// Parsing never fails: an unknown key becomes `Unrecognized`, which keeps
/// the input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    PriceLowHigh,
    PriceHighLow,
    Popularity,
    Latest,
    Featured,
    Unrecognized(String),
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "price-low-high" => SortKey::PriceLowHigh,
            "price-high-low" => SortKey::PriceHighLow,
            "popularity" => SortKey::Popularity,
            "latest" => SortKey::Latest,
            "featured" => SortKey::Featured,
            other => SortKey::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SortKey::PriceLowHigh => "price-low-high",
            SortKey::PriceHighLow => "price-high-low",
            SortKey::Popularity => "popularity",
            SortKey::Latest => "latest",
            SortKey::Featured => "featured",
            SortKey::Unrecognized(raw) => raw,
        }
    }

    /// Keep the input order, which is ascending id in both adapters.
    pub fn input_order() -> Self {
        SortKey::Unrecognized(String::new())
    }

    /// Every key with a defined comparator.
    pub fn known() -> [SortKey; 5] {
        [
            SortKey::PriceLowHigh,
            SortKey::PriceHighLow,
            SortKey::Popularity,
            SortKey::Latest,
            SortKey::Featured,
        ]
    }
}

impl From<String> for SortKey {
    fn from(raw: String) -> Self {
        SortKey::parse(&raw)
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// The values a query resets to. The storefront panel and the catalog API
/// disagree on both, so each call site picks its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefaults {
    pub price_ceiling: Option<f64>,
    pub sort: SortKey,
}

impl QueryDefaults {
    /// Storefront control panel: bounded price slider, cheapest first.
    pub fn control_panel(ceiling: f64) -> Self {
        Self {
            price_ceiling: Some(ceiling),
            sort: SortKey::PriceLowHigh,
        }
    }

    /// Catalog API: no price ceiling, featured listings first.
    pub fn catalog_api() -> Self {
        Self {
            price_ceiling: None,
            sort: SortKey::Featured,
        }
    }
}

// =============================================================================
// CatalogQuery
// =============================================================================

/// Filter and sort specification.
///
/// Every builder consumes `self` and returns the next value; nothing in the
/// crate mutates a query that has been handed to `apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Allowed categories, empty means all
    pub categories: BTreeSet<String>,
    /// Allowed brands, empty means all
    pub brands: BTreeSet<String>,
    pub min_price: f64,
    /// Inclusive upper bound, `None` is unbounded
    pub max_price: Option<f64>,
    /// 0.0 disables the rating predicate
    pub min_rating: f32,
    pub in_stock_only: bool,
    /// Raw search box contents; see [`CatalogQuery::search_term`]
    pub search: String,
    pub sort: SortKey,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::from_defaults(&QueryDefaults::catalog_api())
    }
}

impl CatalogQuery {
    pub fn from_defaults(defaults: &QueryDefaults) -> Self {
        Self {
            categories: BTreeSet::new(),
            brands: BTreeSet::new(),
            min_price: 0.0,
            max_price: defaults.price_ceiling,
            min_rating: 0.0,
            in_stock_only: false,
            search: String::new(),
            sort: defaults.sort.clone(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn without_category(mut self, category: &str) -> Self {
        self.categories.remove(category);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brands.insert(brand.into());
        self
    }

    pub fn without_brand(mut self, brand: &str) -> Self {
        self.brands.remove(brand);
        self
    }

    pub fn with_price_range(mut self, min: f64, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn in_stock_only(mut self, in_stock_only: bool) -> Self {
        self.in_stock_only = in_stock_only;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Trimmed, lowercased search term. Whitespace-only input disables search.
    pub fn search_term(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}
