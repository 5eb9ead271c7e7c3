//! Raw catalog parameters as they arrive from a query string or CLI flags.

use crate::query::{CatalogQuery, QueryDefaults, SortKey};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Unvalidated boundary parameters.
///
/// Every field is kept as a string so a malformed number can be dropped
/// instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
}

impl CatalogParams {
    /// Lower into a query.
    ///
    /// ## Rules
    /// - Empty `category`/`brand` means no restriction
    /// - Non-numeric, negative or non-finite numbers are treated as absent
    /// - Absent `maxPrice` falls back to the defaults' ceiling
    /// - `inStock` is only true for the literal `"true"`
    /// - Absent or blank `sort` uses the defaults' sort key
    pub fn into_query(self, defaults: &QueryDefaults) -> CatalogQuery {
        let mut query = CatalogQuery::from_defaults(defaults);

        if let Some(category) = non_blank(self.category) {
            query = query.with_category(category);
        }
        if let Some(brand) = non_blank(self.brand) {
            query = query.with_brand(brand);
        }
        if let Some(search) = self.search {
            query = query.with_search(search);
        }

        let min_price = parse_amount("minPrice", self.min_price.as_deref()).unwrap_or(0.0);
        let max_price =
            parse_amount("maxPrice", self.max_price.as_deref()).or(defaults.price_ceiling);
        query = query.with_price_range(min_price, max_price);

        if let Some(rating) = parse_amount("minRating", self.min_rating.as_deref()) {
            query = query.with_min_rating(rating as f32);
        }

        query = query.in_stock_only(self.in_stock.as_deref() == Some("true"));

        if let Some(sort) = non_blank(self.sort) {
            query = query.with_sort(SortKey::parse(&sort));
        }

        query
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A finite, non-negative number. Anything else is `None`.
pub fn parse_non_negative(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

fn parse_amount(name: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let value = parse_non_negative(raw);
    if value.is_none() {
        warn!("Ignoring malformed {} parameter: {:?}", name, raw);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CatalogParams {
        let mut params = CatalogParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "category" => params.category = value,
                "brand" => params.brand = value,
                "search" => params.search = value,
                "minPrice" => params.min_price = value,
                "maxPrice" => params.max_price = value,
                "minRating" => params.min_rating = value,
                "inStock" => params.in_stock = value,
                "sort" => params.sort = value,
                other => panic!("unknown param {other}"),
            }
        }
        params
    }

    #[test]
    fn test_empty_params_use_defaults() {
        let api = CatalogParams::default().into_query(&QueryDefaults::catalog_api());
        assert_eq!(api, CatalogQuery::default());

        let panel = CatalogParams::default().into_query(&QueryDefaults::control_panel(2000.0));
        assert_eq!(panel.max_price, Some(2000.0));
        assert_eq!(panel.sort, SortKey::PriceLowHigh);
    }

    #[test]
    fn test_full_params() {
        let query = params(&[
            ("category", "Phones"),
            ("search", "pro"),
            ("minPrice", "100"),
            ("maxPrice", "900.5"),
            ("inStock", "true"),
            ("sort", "latest"),
        ])
        .into_query(&QueryDefaults::catalog_api());

        assert!(query.categories.contains("Phones"));
        assert_eq!(query.search_term().as_deref(), Some("pro"));
        assert_eq!(query.min_price, 100.0);
        assert_eq!(query.max_price, Some(900.5));
        assert!(query.in_stock_only);
        assert_eq!(query.sort, SortKey::Latest);
    }

    #[test]
    fn test_malformed_numbers_are_absent() {
        let query = params(&[
            ("minPrice", "cheap"),
            ("maxPrice", "-5"),
            ("minRating", "NaN"),
        ])
        .into_query(&QueryDefaults::catalog_api());

        assert_eq!(query.min_price, 0.0);
        assert_eq!(query.max_price, None);
        assert_eq!(query.min_rating, 0.0);
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative(" 12.5 "), Some(12.5));
        assert_eq!(parse_non_negative("0"), Some(0.0));
        for bad in ["NaN", "inf", "-1", "cheap", ""] {
            assert_eq!(parse_non_negative(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn test_blank_category_and_sort() {
        let query = params(&[("category", "  "), ("sort", ""), ("inStock", "yes")])
            .into_query(&QueryDefaults::catalog_api());

        assert!(query.categories.is_empty());
        assert_eq!(query.sort, SortKey::Featured);
        assert!(!query.in_stock_only);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let params: CatalogParams =
            serde_json::from_str(r#"{"minPrice":"10","inStock":"true"}"#).unwrap();
        assert_eq!(params.min_price.as_deref(), Some("10"));
        assert_eq!(params.in_stock.as_deref(), Some("true"));
    }
}
