//! Core traits for the filtering pipeline.
//!
//! This module defines the Predicate trait that lets independent product
//! checks be composed into a FilterPipeline.

use catalog_data::Product;

/// A single product check.
///
/// ## Design Note
/// - `Send + Sync` lets the pipeline evaluate predicates on rayon workers
/// - Predicates borrow the product; the snapshot is never mutated
pub trait Predicate: Send + Sync {
    /// Returns the name of this predicate (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether the product passes this predicate.
    fn matches(&self, product: &Product) -> bool;
}
