//! Catalog query evaluation: which products are visible and in what order.
//!
//! This crate provides:
//! - `CatalogQuery`, the one filter/sort specification type
//! - Predicate trait and implementations, composed by `FilterPipeline`
//! - Stable comparators for every sort key
//! - `engine::apply`, the in-process evaluator
//! - `FilterPanel`, caller-held state for a storefront filter panel
//! - Display derivations (discount badge, stars, currency) and suggestions
//!
//! ## Architecture
//! A query is evaluated in two stages:
//! 1. Active predicates remove products (conjunction, input order kept)
//! 2. Survivors are stable-sorted by the query's sort key
//!
//! The store crate lowers the same `CatalogQuery` to SQL; both paths must
//! produce the same ordered result.
//!
//! ## Example Usage
//! ```ignore
//! use query_engine::{engine, CatalogQuery, QueryDefaults};
//!
//! let query = CatalogQuery::from_defaults(&QueryDefaults::control_panel(2000.0))
//!     .with_category("Phones");
//! let visible = engine::apply(&products, &query);
//! ```

pub mod display;
pub mod engine;
pub mod filter_pipeline;
pub mod panel;
pub mod params;
pub mod predicates;
pub mod query;
pub mod sort;
pub mod suggestions;
pub mod traits;

// Re-export main types
pub use display::{
    assess_discount, discount_percent, format_currency, DiscountAnomaly, DiscountAssessment,
    DiscountPolicy, StarRating,
};
pub use engine::{apply, apply_limited};
pub use filter_pipeline::FilterPipeline;
pub use panel::{FilterPanel, PanelView};
pub use params::{parse_non_negative, CatalogParams};
pub use query::{CatalogQuery, QueryDefaults, SortKey, DEFAULT_PRICE_CEILING};
pub use suggestions::{suggest, suggestion_query, Suggestion, SUGGESTION_LIMIT};
pub use traits::Predicate;
