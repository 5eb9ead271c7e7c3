//! Inclusive price window.

use crate::traits::Predicate;
use catalog_data::Product;

/// Passes when `min <= price <= max`. A `None` maximum is unbounded.
pub struct PricePredicate {
    min: f64,
    max: Option<f64>,
}

impl PricePredicate {
    pub fn new(min: f64, max: Option<f64>) -> Self {
        Self { min, max }
    }
}

impl Predicate for PricePredicate {
    fn name(&self) -> &str {
        "PricePredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        product.price >= self.min && self.max.is_none_or(|max| product.price <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[test]
    fn test_bounds_are_inclusive() {
        let predicate = PricePredicate::new(249.99, Some(349.99));

        assert!(predicate.matches(&product(1, "Accessories", 249.99)));
        assert!(predicate.matches(&product(2, "Accessories", 349.99)));
        assert!(!predicate.matches(&product(3, "Accessories", 249.98)));
        assert!(!predicate.matches(&product(4, "Accessories", 350.0)));
    }

    #[test]
    fn test_unbounded_maximum() {
        let predicate = PricePredicate::new(0.0, None);
        assert!(predicate.matches(&product(1, "Laptops", 1_000_000.0)));
        assert!(predicate.matches(&product(2, "Laptops", 0.0)));
    }
}
