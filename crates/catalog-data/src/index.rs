//! CatalogIndex building, validation and aggregate statistics.

use crate::error::{CatalogDataError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

impl CatalogIndex {
    /// Load a seed file into a validated index.
    ///
    /// Steps:
    /// 1. Parse the seed document
    /// 2. Insert sellers and products
    /// 3. Rebuild secondary indices (category, brand)
    /// 4. Validate data integrity
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog seed from {:?}", path);
        let seed = parser::parse_seed(path)?;
        let index = Self::from_seed(seed)?;

        let (sellers, products) = index.counts();
        info!("Loaded {} sellers, {} products", sellers, products);
        Ok(index)
    }

    /// Build a validated index from an already decoded seed.
    pub fn from_seed(seed: CatalogSeed) -> Result<Self> {
        let mut index = CatalogIndex::new();

        for seller in seed.sellers {
            index.insert_seller(seller);
        }
        for product in seed.products {
            // Indices are rebuilt in one pass below
            index.products.insert(product.id, product);
        }

        index.build_secondary_indices();
        index.validate()?;
        Ok(index)
    }

    /// Rebuild category_index and brand_index from scratch.
    pub fn build_secondary_indices(&mut self) {
        self.category_index.clear();
        self.brand_index.clear();

        for (product_id, product) in &self.products {
            self.category_index
                .entry(product.category.clone())
                .or_default()
                .push(*product_id);

            if let Some(brand) = &product.brand {
                self.brand_index
                    .entry(brand.clone())
                    .or_default()
                    .push(*product_id);
            }
        }
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every product's seller exists
    /// - Prices are finite and non-negative
    /// - Ratings are within 0.0 - 5.0
    ///
    /// A current price above the original price is allowed here; the
    /// discount derivation reports it as a data-quality anomaly instead.
    pub fn validate(&self) -> Result<()> {
        for product in self.products.values() {
            if !self.sellers.contains_key(&product.seller_id) {
                return Err(CatalogDataError::MissingReference {
                    entity: "Seller".to_string(),
                    id: product.seller_id,
                });
            }
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(CatalogDataError::InvalidValue {
                    field: "price".to_string(),
                    value: product.price.to_string(),
                });
            }
            if let Some(original) = product.original_price {
                if !original.is_finite() || original < 0.0 {
                    return Err(CatalogDataError::InvalidValue {
                        field: "original_price".to_string(),
                        value: original.to_string(),
                    });
                }
            }
            if !(0.0..=5.0).contains(&product.rating) {
                return Err(CatalogDataError::InvalidValue {
                    field: "rating".to_string(),
                    value: product.rating.to_string(),
                });
            }
            if product.name.trim().is_empty() {
                return Err(CatalogDataError::ValidationError(format!(
                    "product {} has an empty name",
                    product.id
                )));
            }
        }
        Ok(())
    }

    /// Dashboard counts for one seller's listings.
    pub fn seller_stats(&self, seller_id: SellerId) -> SellerStats {
        let products: Vec<&Product> = self.products.values().collect();
        products
            .par_iter()
            .filter(|p| p.seller_id == seller_id)
            .map(|p| SellerStats {
                total: 1,
                published: u64::from(p.status == ProductStatus::Published),
                drafts: u64::from(p.status == ProductStatus::Draft),
            })
            .reduce(SellerStats::default, |a, b| SellerStats {
                total: a.total + b.total,
                published: a.published + b.published,
                drafts: a.drafts + b.drafts,
            })
    }

    /// Category facet values with product counts, sorted by name.
    pub fn categories(&self) -> Vec<Facet> {
        self.category_index
            .iter()
            .map(|(value, ids)| Facet {
                value: value.clone(),
                count: ids.len(),
            })
            .collect()
    }

    /// Brand facet values with product counts, sorted by name.
    pub fn brands(&self) -> Vec<Facet> {
        self.brand_index
            .iter()
            .map(|(value, ids)| Facet {
                value: value.clone(),
                count: ids.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seller(id: SellerId) -> Seller {
        Seller {
            id,
            username: format!("seller{id}"),
            email: format!("seller{id}@mall.test"),
            business_name: format!("Shop {id}"),
            phone: None,
            address: None,
            role: SellerRole::Seller,
            status: SellerStatus::Active,
            verified: true,
            created_at: None,
        }
    }

    fn product(id: ProductId, category: &str, brand: Option<&str>, status: ProductStatus) -> Product {
        Product {
            id,
            seller_id: 1,
            name: format!("Product {id}"),
            category: category.to_string(),
            brand: brand.map(str::to_string),
            description: None,
            shop_name: None,
            location: None,
            price: 10.0 * id as f64,
            original_price: None,
            rating: 4.0,
            review_count: 0,
            quantity: 1,
            image: None,
            status,
            is_featured: false,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn build_seed() -> CatalogSeed {
        CatalogSeed {
            sellers: vec![seller(1), seller(2)],
            products: vec![
                product(1, "Phones", Some("Apple"), ProductStatus::Published),
                product(2, "Phones", Some("Samsung"), ProductStatus::Draft),
                product(3, "Laptops", Some("Apple"), ProductStatus::Published),
                product(4, "Accessories", None, ProductStatus::Archived),
            ],
        }
    }

    #[test]
    fn test_from_seed_builds_indices() {
        let index = CatalogIndex::from_seed(build_seed()).unwrap();

        assert_eq!(index.counts(), (2, 4));
        assert_eq!(index.get_products_by_category("Phones"), &[1, 2]);
        assert_eq!(index.get_products_by_brand("Apple"), &[1, 3]);
        assert!(index.get_products_by_brand("Sony").is_empty());
    }

    #[test]
    fn test_products_iterate_in_id_order() {
        let mut seed = build_seed();
        seed.products.reverse();
        let index = CatalogIndex::from_seed(seed).unwrap();

        let ids: Vec<ProductId> = index.products().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_validate_missing_seller() {
        let mut seed = build_seed();
        seed.products[0].seller_id = 99;

        let err = CatalogIndex::from_seed(seed).unwrap_err();
        assert!(matches!(
            err,
            CatalogDataError::MissingReference { id: 99, .. }
        ));
    }

    #[test]
    fn test_validate_rejects_negative_price_and_bad_rating() {
        let mut seed = build_seed();
        seed.products[1].price = -1.0;
        let err = CatalogIndex::from_seed(seed).unwrap_err();
        assert!(matches!(err, CatalogDataError::InvalidValue { ref field, .. } if field == "price"));

        let mut seed = build_seed();
        seed.products[2].rating = 5.5;
        let err = CatalogIndex::from_seed(seed).unwrap_err();
        assert!(matches!(err, CatalogDataError::InvalidValue { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_price_above_original_is_accepted() {
        let mut seed = build_seed();
        seed.products[0].original_price = Some(1.0);
        assert!(CatalogIndex::from_seed(seed).is_ok());
    }

    #[test]
    fn test_seller_stats() {
        let index = CatalogIndex::from_seed(build_seed()).unwrap();

        let stats = index.seller_stats(1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.drafts, 1);

        assert_eq!(index.seller_stats(2), SellerStats::default());
    }

    #[test]
    fn test_facets() {
        let index = CatalogIndex::from_seed(build_seed()).unwrap();

        let categories = index.categories();
        let names: Vec<&str> = categories.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(names, vec!["Accessories", "Laptops", "Phones"]);
        assert_eq!(categories[2].count, 2);

        let brands = index.brands();
        assert_eq!(brands.len(), 2);
        assert_eq!(brands[0], Facet { value: "Apple".to_string(), count: 2 });
    }

    #[test]
    fn test_insert_and_remove_keep_indices_current() {
        let mut index = CatalogIndex::from_seed(build_seed()).unwrap();

        let mut moved = index.get_product(1).unwrap().clone();
        moved.category = "Tablets".to_string();
        index.insert_product(moved);

        assert_eq!(index.get_products_by_category("Phones"), &[2]);
        assert_eq!(index.get_products_by_category("Tablets"), &[1]);

        index.remove_product(3);
        assert!(index.get_products_by_category("Laptops").is_empty());
        assert_eq!(index.get_products_by_brand("Apple"), &[1]);
        assert_eq!(index.next_product_id(), 5);
    }

    #[test]
    fn test_load_from_file() {
        let seed = build_seed();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&seed).unwrap().as_bytes())
            .unwrap();

        let index = CatalogIndex::load_from_file(file.path()).unwrap();
        assert_eq!(index.counts(), (2, 4));
    }
}
