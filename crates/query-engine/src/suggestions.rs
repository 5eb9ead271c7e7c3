//! Inline search suggestions shown while typing.

use crate::display::format_currency;
use crate::predicates::TextPredicate;
use crate::query::{CatalogQuery, SortKey};
use crate::traits::Predicate;
use catalog_data::{Product, ProductId};
use serde::{Deserialize, Serialize};

/// Maximum number of inline suggestions.
pub const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Currency formatted, e.g. `$879.99`
    pub price: String,
}

impl From<&Product> for Suggestion {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: format_currency(product.price),
        }
    }
}

/// The store-side form of [`suggest`]: the text predicate alone, unbounded
/// price, input order.
pub fn suggestion_query(term: &str) -> CatalogQuery {
    CatalogQuery::default()
        .with_search(term)
        .with_sort(SortKey::input_order())
}

/// Text matches in input order, at most `limit`. A blank term yields nothing.
pub fn suggest(products: &[Product], term: &str, limit: usize) -> Vec<Suggestion> {
    let Some(predicate) = TextPredicate::new(term) else {
        return Vec::new();
    };
    products
        .iter()
        .filter(|product| predicate.matches(product))
        .take(limit)
        .map(Suggestion::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::reference_catalog;

    #[test]
    fn test_blank_term() {
        let catalog = reference_catalog();
        assert!(suggest(&catalog, "", SUGGESTION_LIMIT).is_empty());
        assert!(suggest(&catalog, "   ", SUGGESTION_LIMIT).is_empty());
    }

    #[test]
    fn test_limit_and_input_order() {
        let catalog = reference_catalog();
        let accessories = suggest(&catalog, "accessories", SUGGESTION_LIMIT);

        let ids: Vec<ProductId> = accessories.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_suggestion_query_matches_in_process_suggest() {
        let catalog = reference_catalog();
        for term in ["a", "samsung", "PHONE", "  "] {
            let query = suggestion_query(term);
            let via_query: Vec<ProductId> = crate::apply_limited(&catalog, &query, Some(SUGGESTION_LIMIT))
                .iter()
                .map(|p| p.id)
                .collect();
            let direct: Vec<ProductId> = suggest(&catalog, term, SUGGESTION_LIMIT)
                .iter()
                .map(|s| s.id)
                .collect();

            if query.search_term().is_some() {
                assert_eq!(via_query, direct, "term {term:?}");
            } else {
                assert!(direct.is_empty());
            }
        }
    }

    #[test]
    fn test_suggestion_fields() {
        let catalog = reference_catalog();
        let found = suggest(&catalog, "macbook", SUGGESTION_LIMIT);

        assert_eq!(
            found,
            vec![Suggestion {
                id: 2,
                name: "MacBook Pro M2".to_string(),
                category: "Laptops".to_string(),
                price: "$1,499.99".to_string(),
            }]
        );
    }
}
