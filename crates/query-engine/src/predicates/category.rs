//! Keep products whose category is one of the selected values.

use crate::traits::Predicate;
use catalog_data::Product;
use std::collections::BTreeSet;

/// Exact, case-sensitive membership in the selected category set.
pub struct CategoryPredicate {
    categories: BTreeSet<String>,
}

impl CategoryPredicate {
    pub fn new(categories: BTreeSet<String>) -> Self {
        Self { categories }
    }
}

impl Predicate for CategoryPredicate {
    fn name(&self) -> &str {
        "CategoryPredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        self.categories.contains(&product.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[test]
    fn test_category_membership() {
        let predicate = CategoryPredicate::new(
            ["Phones".to_string(), "Laptops".to_string()].into_iter().collect(),
        );

        assert!(predicate.matches(&product(1, "Phones", 10.0)));
        assert!(predicate.matches(&product(2, "Laptops", 10.0)));
        assert!(!predicate.matches(&product(3, "Accessories", 10.0)));
        assert!(!predicate.matches(&product(4, "phones", 10.0)));
    }
}
