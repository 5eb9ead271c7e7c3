//! Comparators for each sort key.
//!
//! All sorting goes through `slice::sort_by`, which is stable, so products
//! with equal keys keep their input order.

use crate::query::SortKey;
use catalog_data::Product;
use std::cmp::Ordering;

/// Newest first; products without a timestamp sort after all dated ones.
fn newest_first(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn price_ascending(a: &Product, b: &Product) -> Ordering {
    a.price.total_cmp(&b.price)
}

fn price_descending(a: &Product, b: &Product) -> Ordering {
    b.price.total_cmp(&a.price)
}

fn most_reviewed(a: &Product, b: &Product) -> Ordering {
    b.review_count.cmp(&a.review_count)
}

fn latest(a: &Product, b: &Product) -> Ordering {
    newest_first(a.created_at, b.created_at).then_with(|| b.id.cmp(&a.id))
}

fn featured(a: &Product, b: &Product) -> Ordering {
    b.is_featured
        .cmp(&a.is_featured)
        .then_with(|| newest_first(a.created_at, b.created_at))
}

pub type Comparator = fn(&Product, &Product) -> Ordering;

/// Comparator for `key`, or `None` when the key leaves input order alone.
pub fn comparator(key: &SortKey) -> Option<Comparator> {
    let compare: Comparator = match key {
        SortKey::PriceLowHigh => price_ascending,
        SortKey::PriceHighLow => price_descending,
        SortKey::Popularity => most_reviewed,
        SortKey::Latest => latest,
        SortKey::Featured => featured,
        SortKey::Unrecognized(_) => return None,
    };
    Some(compare)
}

/// Stable in-place sort.
pub fn sort_products(products: &mut [Product], key: &SortKey) {
    match comparator(key) {
        Some(compare) => products.sort_by(compare),
        None => tracing::debug!("Sort key {:?} not recognized, keeping input order", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_price_sorts_are_stable() {
        let mut products = vec![
            product(1, "Phones", 20.0),
            product(2, "Phones", 10.0),
            product(3, "Phones", 20.0),
            product(4, "Phones", 10.0),
        ];

        sort_products(&mut products, &SortKey::PriceLowHigh);
        assert_eq!(ids(&products), vec![2, 4, 1, 3]);

        sort_products(&mut products, &SortKey::PriceHighLow);
        assert_eq!(ids(&products), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_popularity() {
        let mut products: Vec<Product> = (1..=3).map(|id| product(id, "Phones", 1.0)).collect();
        products[0].review_count = 5;
        products[1].review_count = 50;
        products[2].review_count = 5;

        sort_products(&mut products, &SortKey::Popularity);
        assert_eq!(ids(&products), vec![2, 1, 3]);
    }

    #[test]
    fn test_latest_uses_timestamps_then_id() {
        let mut products: Vec<Product> = (1..=4).map(|id| product(id, "Phones", 1.0)).collect();
        products[0].created_at = Some(300);
        products[1].created_at = None;
        products[2].created_at = Some(100);
        products[3].created_at = None;

        sort_products(&mut products, &SortKey::Latest);
        assert_eq!(ids(&products), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_featured_then_newest() {
        let mut products: Vec<Product> = (1..=4).map(|id| product(id, "Phones", 1.0)).collect();
        products[0].created_at = Some(100);
        products[1].created_at = Some(200);
        products[1].is_featured = true;
        products[2].created_at = Some(300);
        products[3].is_featured = true;

        sort_products(&mut products, &SortKey::Featured);
        assert_eq!(ids(&products), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_unrecognized_key_keeps_order() {
        let mut products = vec![
            product(3, "Phones", 5.0),
            product(1, "Phones", 1.0),
            product(2, "Phones", 3.0),
        ];

        sort_products(&mut products, &SortKey::parse("name-a-z"));
        assert_eq!(ids(&products), vec![3, 1, 2]);
    }
}
