//! Lowering a `CatalogQuery` to SQL (predicate pushdown).
//!
//! The generated clauses must select and order exactly what
//! `query_engine::apply` would over the same rows in id order. Every ORDER BY
//! therefore ends in an id tie-breaker standing in for the stable sort.

use query_engine::{CatalogQuery, SortKey};
use rusqlite::types::Value;

/// WHERE and ORDER BY fragments plus their positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredQuery {
    pub where_clause: String,
    pub order_by: String,
    pub params: Vec<Value>,
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub fn order_by(sort: &SortKey) -> &'static str {
    match sort {
        SortKey::PriceLowHigh => "price ASC, id ASC",
        SortKey::PriceHighLow => "price DESC, id ASC",
        SortKey::Popularity => "review_count DESC, id ASC",
        SortKey::Latest => "created_at DESC NULLS LAST, id DESC",
        SortKey::Featured => "is_featured DESC, created_at DESC NULLS LAST, id ASC",
        SortKey::Unrecognized(_) => "id ASC",
    }
}

/// Lower the query's predicates and sort key.
///
/// Publication visibility is not part of the query; the store adds it.
pub fn lower(query: &CatalogQuery) -> LoweredQuery {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if !query.categories.is_empty() {
        conditions.push(format!(
            "category IN ({})",
            placeholders(query.categories.len())
        ));
        params.extend(query.categories.iter().cloned().map(Value::Text));
    }

    if !query.brands.is_empty() {
        conditions.push(format!("brand IN ({})", placeholders(query.brands.len())));
        params.extend(query.brands.iter().cloned().map(Value::Text));
    }

    conditions.push("price >= ?".to_string());
    params.push(Value::Real(query.min_price));
    if let Some(max) = query.max_price {
        conditions.push("price <= ?".to_string());
        params.push(Value::Real(max));
    }

    if query.min_rating > 0.0 {
        conditions.push("rating >= ?".to_string());
        params.push(Value::Real(f64::from(query.min_rating)));
    }

    if query.in_stock_only {
        conditions.push("quantity > 0".to_string());
    }

    if let Some(term) = query.search_term() {
        conditions.push(
            "(contains_ci(name, ?) OR contains_ci(category, ?) OR contains_ci(description, ?))"
                .to_string(),
        );
        for _ in 0..3 {
            params.push(Value::Text(term.clone()));
        }
    }

    LoweredQuery {
        where_clause: conditions.join(" AND "),
        order_by: order_by(&query.sort).to_string(),
        params,
    }
}
