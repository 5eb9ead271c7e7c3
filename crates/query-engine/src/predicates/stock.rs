//! In-stock only.

use crate::traits::Predicate;
use catalog_data::Product;

pub struct StockPredicate;

impl Predicate for StockPredicate {
    fn name(&self) -> &str {
        "StockPredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        product.in_stock()
    }
}
