//! Predicate implementations for the catalog pipeline.
//!
//! Each predicate covers one filter control. `FilterPipeline::from_query`
//! installs only the ones a query activates.

pub mod brand;
pub mod category;
pub mod price;
pub mod rating;
pub mod stock;
pub mod text;

// Re-export for convenience
pub use brand::BrandPredicate;
pub use category::CategoryPredicate;
pub use price::PricePredicate;
pub use rating::RatingPredicate;
pub use stock::StockPredicate;
pub use text::{contains_ci, TextPredicate};
