//! Keep products whose brand is one of the selected values.

use crate::traits::Predicate;
use catalog_data::Product;
use std::collections::BTreeSet;

/// A product without a brand never matches.
pub struct BrandPredicate {
    brands: BTreeSet<String>,
}

impl BrandPredicate {
    pub fn new(brands: BTreeSet<String>) -> Self {
        Self { brands }
    }
}

impl Predicate for BrandPredicate {
    fn name(&self) -> &str {
        "BrandPredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        product
            .brand
            .as_ref()
            .is_some_and(|brand| self.brands.contains(brand))
    }
}
