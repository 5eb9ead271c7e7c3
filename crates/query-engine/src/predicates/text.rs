//! Free-text search over name, category and description.

use crate::traits::Predicate;
use catalog_data::Product;

/// Case-insensitive substring test. `needle` must already be lowercased.
///
/// The SQLite store registers this same function, so both adapters agree on
/// Unicode case folding.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Matches when the term occurs in the name, category or description.
pub struct TextPredicate {
    term: String,
}

impl TextPredicate {
    /// Returns `None` for a blank term, which disables text search.
    pub fn new(raw: &str) -> Option<Self> {
        let term = raw.trim();
        if term.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_lowercase(),
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

impl Predicate for TextPredicate {
    fn name(&self) -> &str {
        "TextPredicate"
    }

    fn matches(&self, product: &Product) -> bool {
        contains_ci(&product.name, &self.term)
            || contains_ci(&product.category, &self.term)
            || product
                .description
                .as_deref()
                .is_some_and(|description| contains_ci(description, &self.term))
    }
}
