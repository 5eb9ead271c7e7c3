//! Caller-held state behind a storefront filter panel.
//!
//! Each user event derives a new `CatalogQuery` from the current one and runs
//! exactly one evaluation over the same product snapshot.

use crate::engine;
use crate::query::{CatalogQuery, QueryDefaults, SortKey};
use crate::suggestions::{self, Suggestion, SUGGESTION_LIMIT};
use catalog_data::Product;
use serde::Serialize;
use std::sync::Arc;

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub products: Vec<Product>,
    pub count: usize,
    pub query: CatalogQuery,
}

pub struct FilterPanel {
    products: Arc<[Product]>,
    defaults: QueryDefaults,
    query: CatalogQuery,
    evaluations: u64,
}

impl FilterPanel {
    pub fn new(products: impl Into<Arc<[Product]>>, defaults: QueryDefaults) -> Self {
        let query = CatalogQuery::from_defaults(&defaults);
        Self {
            products: products.into(),
            defaults,
            query,
            evaluations: 0,
        }
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// Number of evaluations run so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Evaluate the current query without changing it.
    pub fn refresh(&mut self) -> PanelView {
        self.evaluations += 1;
        let products = engine::apply(&self.products, &self.query);
        tracing::debug!(
            "Panel evaluation #{}: {} of {} products",
            self.evaluations,
            products.len(),
            self.products.len()
        );
        PanelView {
            count: products.len(),
            products,
            query: self.query.clone(),
        }
    }

    fn commit(&mut self, next: CatalogQuery) -> PanelView {
        self.query = next;
        self.refresh()
    }

    pub fn toggle_category(&mut self, category: &str) -> PanelView {
        let current = self.query.clone();
        let next = if current.categories.contains(category) {
            current.without_category(category)
        } else {
            current.with_category(category)
        };
        self.commit(next)
    }

    pub fn toggle_brand(&mut self, brand: &str) -> PanelView {
        let current = self.query.clone();
        let next = if current.brands.contains(brand) {
            current.without_brand(brand)
        } else {
            current.with_brand(brand)
        };
        self.commit(next)
    }

    pub fn set_price_range(&mut self, min: f64, max: Option<f64>) -> PanelView {
        let next = self.query.clone().with_price_range(min, max);
        self.commit(next)
    }

    pub fn set_min_rating(&mut self, rating: f32) -> PanelView {
        let next = self.query.clone().with_min_rating(rating);
        self.commit(next)
    }

    pub fn set_in_stock_only(&mut self, in_stock_only: bool) -> PanelView {
        let next = self.query.clone().in_stock_only(in_stock_only);
        self.commit(next)
    }

    pub fn set_search(&mut self, search: &str) -> PanelView {
        let next = self.query.clone().with_search(search);
        self.commit(next)
    }

    pub fn set_sort(&mut self, sort: SortKey) -> PanelView {
        let next = self.query.clone().with_sort(sort);
        self.commit(next)
    }

    /// Reset every control to its default and evaluate once.
    pub fn clear(&mut self) -> PanelView {
        let next = CatalogQuery::from_defaults(&self.defaults);
        self.commit(next)
    }

    /// Select the snapshot category matching a URL parameter, ignoring case.
    ///
    /// Returns `None` without evaluating when nothing matches.
    pub fn preselect_category(&mut self, param: &str) -> Option<PanelView> {
        let wanted = param.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        let category = self
            .products
            .iter()
            .map(|p| p.category.as_str())
            .find(|category| category.to_lowercase() == wanted)?
            .to_string();

        let mut next = self.query.clone();
        next.categories.clear();
        Some(self.commit(next.with_category(category)))
    }

    /// Inline suggestions over the whole snapshot, independent of the
    /// current filters. Does not count as an evaluation.
    pub fn suggestions(&self, term: &str) -> Vec<Suggestion> {
        suggestions::suggest(&self.products, term, SUGGESTION_LIMIT)
    }
}
