//! The FilterPipeline chains predicates.
//!
//! This module provides the FilterPipeline struct that combines the active
//! predicates of a query using the builder pattern.

use crate::predicates::*;
use crate::query::CatalogQuery;
use crate::traits::Predicate;
use catalog_data::Product;
use rayon::prelude::*;
use tracing;

/// Conjunction of predicates.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_predicate(CategoryPredicate::new(categories))
///     .add_predicate(PricePredicate::new(0.0, Some(2000.0)))
///     .add_predicate(StockPredicate);
///
/// let visible = pipeline.apply(&products);
/// ```
pub struct FilterPipeline {
    predicates: Vec<Box<dyn Predicate>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate to the pipeline (builder pattern).
    pub fn add_predicate(mut self, predicate: impl Predicate + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Build the pipeline for a query, installing only active predicates.
    ///
    /// The price predicate is always installed; the others only when the
    /// query sets them.
    pub fn from_query(query: &CatalogQuery) -> Self {
        let mut pipeline = Self::new();

        if !query.categories.is_empty() {
            pipeline = pipeline.add_predicate(CategoryPredicate::new(query.categories.clone()));
        }
        if !query.brands.is_empty() {
            pipeline = pipeline.add_predicate(BrandPredicate::new(query.brands.clone()));
        }
        pipeline = pipeline.add_predicate(PricePredicate::new(query.min_price, query.max_price));
        if query.min_rating > 0.0 {
            pipeline = pipeline.add_predicate(RatingPredicate::new(query.min_rating));
        }
        if query.in_stock_only {
            pipeline = pipeline.add_predicate(StockPredicate);
        }
        if let Some(text) = TextPredicate::new(&query.search) {
            pipeline = pipeline.add_predicate(text);
        }

        pipeline
    }

    /// Names of the installed predicates, in evaluation order.
    pub fn names(&self) -> Vec<&str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    /// Apply all predicates in sequence.
    ///
    /// ## Algorithm
    /// 1. Start with references to every input product
    /// 2. For each predicate in order:
    ///    a. Log predicate name and input count
    ///    b. Keep matching products (parallel, order preserving)
    ///    c. Log output count
    /// 3. Clone the survivors
    ///
    /// Survivors keep their relative input order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut current: Vec<&Product> = products.iter().collect();
        for predicate in &self.predicates {
            tracing::debug!(
                "Applying predicate: {} (input count: {})",
                predicate.name(),
                current.len()
            );
            current = current
                .into_par_iter()
                .filter(|product| predicate.matches(product))
                .collect();
            tracing::debug!(
                "Predicate applied: {} (output count: {})",
                predicate.name(),
                current.len()
            );
        }
        current.into_iter().cloned().collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let products = vec![product(1, "Phones", 10.0), product(2, "Laptops", 20.0)];

        let filtered = pipeline.apply(&products);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_predicate() {
        let pipeline = FilterPipeline::new().add_predicate(PricePredicate::new(15.0, None));
        let products = vec![product(1, "Phones", 10.0), product(2, "Laptops", 20.0)];

        let filtered = pipeline.apply(&products);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_from_query_installs_active_predicates_only() {
        let default = FilterPipeline::from_query(&CatalogQuery::default());
        assert_eq!(default.names(), vec!["PricePredicate"]);

        let query = CatalogQuery::default()
            .with_category("Phones")
            .with_min_rating(4.0)
            .in_stock_only(true)
            .with_search("  ");
        let pipeline = FilterPipeline::from_query(&query);
        assert_eq!(
            pipeline.names(),
            vec![
                "CategoryPredicate",
                "PricePredicate",
                "RatingPredicate",
                "StockPredicate"
            ]
        );
    }

    #[test]
    fn test_preserves_input_order() {
        let products: Vec<Product> = (1..=500)
            .rev()
            .map(|id| product(id, "Phones", id as f64))
            .collect();

        let pipeline = FilterPipeline::new().add_predicate(PricePredicate::new(100.0, Some(400.0)));
        let ids: Vec<u64> = pipeline.apply(&products).iter().map(|p| p.id).collect();

        let expected: Vec<u64> = (100..=400).rev().collect();
        assert_eq!(ids, expected);
    }
}
