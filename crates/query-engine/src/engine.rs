//! In-process evaluation of a `CatalogQuery`.

use crate::filter_pipeline::FilterPipeline;
use crate::query::CatalogQuery;
use crate::sort;
use catalog_data::Product;

/// Filter then stable-sort. Pure: neither argument is modified.
pub fn apply(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    apply_limited(products, query, None)
}

/// Like [`apply`], truncated to `limit` entries after sorting.
pub fn apply_limited(
    products: &[Product],
    query: &CatalogQuery,
    limit: Option<usize>,
) -> Vec<Product> {
    let pipeline = FilterPipeline::from_query(query);
    let mut survivors = pipeline.apply(products);
    sort::sort_products(&mut survivors, &query.sort);

    if let Some(limit) = limit {
        survivors.truncate(limit);
    }
    survivors
}
