//! Minimum rating threshold.

use crate::traits::Predicate;
use catalog_data::Product;

pub struct RatingPredicate {
    min_rating: f32,
}

impl RatingPredicate {
    pub fn new(min_rating: f32) -> Self {
        Self { min_rating }
    }
}

impl Predicate for RatingPredicate {
    fn name(&self) -> &str {
        "RatingPredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        product.rating >= self.min_rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[test]
    fn test_rating_threshold() {
        let predicate = RatingPredicate::new(4.5);

        let mut high = product(1, "Phones", 10.0);
        high.rating = 4.5;
        let mut low = product(2, "Phones", 10.0);
        low.rating = 4.0;

        assert!(predicate.matches(&high));
        assert!(!predicate.matches(&low));
    }
}
