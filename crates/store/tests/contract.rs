//! Contract suite shared by every store backend.
//!
//! Each backend is loaded with the same fixtures and must return the same
//! ordered ids as `query_engine::apply` over the published products in id
//! order.

use catalog_data::{
    parser, CatalogSeed, Product, ProductId, ProductStatus, Seller, SellerRole, SellerStatus,
};
use query_engine::{apply_limited, CatalogQuery, QueryDefaults, SortKey};
use std::collections::BTreeMap;
use store::{
    MemoryStore, ProductDraft, SellerListing, SqliteStore, Store, StoreError,
};

// =============================================================================
// Fixtures
// =============================================================================

fn extra(id: ProductId, name: &str, category: &str, price: f64) -> Product {
    Product {
        id,
        seller_id: 2,
        name: name.to_string(),
        category: category.to_string(),
        brand: None,
        description: None,
        shop_name: Some("Douala Gadgets".to_string()),
        location: None,
        price,
        original_price: None,
        rating: 0.0,
        review_count: 0,
        quantity: 1,
        image: None,
        status: ProductStatus::Published,
        is_featured: false,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

/// The nine-product storefront catalog plus listings that exercise
/// visibility, ties and missing timestamps.
fn fixture_seed() -> CatalogSeed {
    let mut seed = parser::parse_seed_str(include_str!("../../../data/catalog.json"), "catalog.json")
        .unwrap();

    let mut draft = extra(10, "Pixel 8 (draft)", "Phones", 699.0);
    draft.status = ProductStatus::Draft;
    draft.updated_at = Some(1_690_000_000);

    let mut inactive = extra(11, "Galaxy Tab S9", "Accessories", 799.0);
    inactive.is_active = false;

    let mut sold_out = extra(12, "Nokia 3310", "Phones", 59.99);
    sold_out.brand = Some("Nokia".to_string());
    sold_out.quantity = 0;
    sold_out.rating = 3.5;
    sold_out.review_count = 203;

    let mut archived = extra(13, "iPhone 8", "Phones", 199.0);
    archived.status = ProductStatus::Archived;

    let mut charger = extra(14, "Anker Charger", "Accessories", 249.99);
    charger.rating = 4.5;
    charger.review_count = 156;
    charger.created_at = Some(1_680_566_400);
    charger.updated_at = Some(1_680_566_400);

    let mut earbuds = extra(15, "Écouteurs Sans Fil", "Accessories", 49.0);
    earbuds.description = Some("Écouteurs Bluetooth, boîtier de charge".to_string());
    earbuds.is_featured = true;
    earbuds.rating = 4.0;

    seed.products
        .extend([draft, inactive, sold_out, archived, charger, earbuds]);
    seed
}

fn backends() -> Vec<Box<dyn Store>> {
    let stores: Vec<Box<dyn Store>> = vec![
        Box::new(MemoryStore::new()),
        Box::new(SqliteStore::open_in_memory().unwrap()),
    ];
    for store in &stores {
        store.import(fixture_seed()).unwrap();
    }
    stores
}

fn published_in_id_order() -> Vec<Product> {
    let by_id: BTreeMap<ProductId, Product> = fixture_seed()
        .products
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    by_id.into_values().filter(|p| p.is_published()).collect()
}

fn ids(products: &[Product]) -> Vec<ProductId> {
    products.iter().map(|p| p.id).collect()
}

fn panel_defaults() -> CatalogQuery {
    CatalogQuery::from_defaults(&QueryDefaults::control_panel(2000.0))
}

fn queries() -> Vec<CatalogQuery> {
    let mut queries = Vec::new();
    let sorts: Vec<SortKey> = SortKey::known()
        .into_iter()
        .chain([SortKey::parse("alphabetical")])
        .collect();

    for sort in sorts {
        let base = CatalogQuery::default().with_sort(sort);
        queries.push(base.clone());
        queries.push(base.clone().with_category("Phones"));
        queries.push(base.clone().with_category("Accessories").with_category("Laptops"));
        queries.push(base.clone().with_brand("Apple").with_brand("Samsung"));
        queries.push(base.clone().with_price_range(249.99, Some(989.99)));
        queries.push(base.clone().with_min_rating(4.5));
        queries.push(base.clone().in_stock_only(true));
        queries.push(base.clone().with_search("phone"));
        queries.push(base.clone().with_search("  PRO "));
        queries.push(base.clone().with_search("ÉCOUTEURS"));
        queries.push(base.clone().with_search("   "));
        queries.push(base.clone().with_search("zzz-nothing"));
        queries.push(
            base.clone()
                .with_category("Accessories")
                .with_price_range(0.0, Some(500.0))
                .with_min_rating(4.0)
                .in_stock_only(true),
        );
    }
    queries.push(panel_defaults());
    queries
}

// =============================================================================
// Catalog contract
// =============================================================================

#[test]
fn test_backends_agree_with_in_process_evaluation() {
    let oracle_input = published_in_id_order();

    for store in backends() {
        for query in queries() {
            for limit in [None, Some(1), Some(5)] {
                let expected = ids(&apply_limited(&oracle_input, &query, limit));
                let actual = ids(&store.list_published(&query, limit).unwrap());
                assert_eq!(
                    actual,
                    expected,
                    "backend {} diverged for {:?} (limit {:?})",
                    store.backend_name(),
                    query,
                    limit
                );
            }
        }
    }
}

#[test]
fn test_only_published_active_products_are_visible() {
    for store in backends() {
        let visible = ids(&store.list_published(&CatalogQuery::default(), None).unwrap());
        for hidden in [10, 11, 13] {
            assert!(!visible.contains(&hidden), "{} leaked {hidden}", store.backend_name());
            assert!(store.find_published(hidden).unwrap().is_none());
        }
        assert_eq!(visible.len(), 12);
        assert!(store.find_published(1).unwrap().is_some());
    }
}

#[test]
fn test_reference_scenarios() {
    for store in backends() {
        let phones = store
            .list_published(&panel_defaults().with_category("Phones").in_stock_only(true), None)
            .unwrap();
        let names: Vec<&str> = phones.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Samsung Galaxy S22", "iPhone 13 Pro"]);

        let five_star = store
            .list_published(&panel_defaults().with_min_rating(5.0), None)
            .unwrap();
        assert_eq!(ids(&five_star), vec![6, 2]);
    }
}

#[test]
fn test_equal_prices_keep_id_order() {
    for store in backends() {
        let cheap = store
            .list_published(
                &panel_defaults().with_price_range(249.99, Some(249.99)),
                None,
            )
            .unwrap();
        assert_eq!(ids(&cheap), vec![4, 14], "{}", store.backend_name());

        let descending = store
            .list_published(
                &CatalogQuery::default()
                    .with_price_range(989.99, Some(989.99))
                    .with_sort(SortKey::PriceHighLow),
                None,
            )
            .unwrap();
        assert_eq!(ids(&descending), vec![7, 9]);
    }
}

#[test]
fn test_featured_listings() {
    for store in backends() {
        let featured = ids(&store.featured(8).unwrap());
        // Dated listings newest first, the undated one last
        assert_eq!(featured, vec![6, 2, 1, 15], "{}", store.backend_name());
        assert_eq!(ids(&store.featured(2).unwrap()), vec![6, 2]);
    }
}

// =============================================================================
// Seller dashboard contract
// =============================================================================

#[test]
fn test_seller_listing_order_and_filters() {
    for store in backends() {
        let name = store.backend_name();

        let yaounde = ids(&store.list_for_seller(3, &SellerListing::default()).unwrap());
        assert_eq!(yaounde, vec![6, 4], "{name}");

        let drafts = store
            .list_for_seller(2, &SellerListing::from_params(Some("draft"), None))
            .unwrap();
        assert_eq!(ids(&drafts), vec![10], "{name}");

        let search = store
            .list_for_seller(
                2,
                &SellerListing::from_params(Some("all"), Some("GALAXY".to_string())),
            )
            .unwrap();
        assert_eq!(ids(&search), vec![8, 3, 11], "{name}");

        let by_shop = store
            .list_for_seller(3, &SellerListing::from_params(None, Some("yaounde".to_string())))
            .unwrap();
        assert_eq!(by_shop.len(), 2, "{name}");
    }
}

#[test]
fn test_seller_stats() {
    for store in backends() {
        let stats = store.stats(2).unwrap();
        assert_eq!(stats.total, 13, "{}", store.backend_name());
        assert_eq!(stats.published, 11);
        assert_eq!(stats.drafts, 1);
    }
}

#[test]
fn test_product_lifecycle() {
    for store in backends() {
        let name = store.backend_name();

        let mut draft = ProductDraft::new("Pixel 8 Pro", "Phones", 999.0);
        draft.brand = Some("Google".to_string());
        draft.quantity = 2;
        let created = store.create(3, draft.clone()).unwrap();
        assert_eq!(created.id, 16, "{name}");
        assert_eq!(created.shop_name.as_deref(), Some("Yaounde Audio"));
        assert!(store.find_published(created.id).unwrap().is_none());

        draft.status = ProductStatus::Published;
        draft.price = 949.0;
        let updated = store.update(3, created.id, draft).unwrap().unwrap();
        assert_eq!(updated.price, 949.0);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let google = store
            .list_published(&CatalogQuery::default().with_brand("Google"), None)
            .unwrap();
        assert_eq!(ids(&google), vec![created.id], "{name}");

        assert!(!store.delete(2, created.id).unwrap());
        assert!(store.delete(3, created.id).unwrap());
        assert!(store.find(3, created.id).unwrap().is_none());
        assert!(!store.delete(3, created.id).unwrap());
    }
}

#[test]
fn test_invalid_drafts_are_rejected() {
    for store in backends() {
        let err = store
            .create(2, ProductDraft::new("", "Phones", -3.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)), "{}", store.backend_name());

        let err = store
            .update(2, 1, ProductDraft::new("iPhone", "", 1.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }
}

#[test]
fn test_admin_delete_any() {
    for store in backends() {
        assert!(store.delete_any(9).unwrap());
        assert!(!store.delete_any(9).unwrap());
        assert!(store.find_published(9).unwrap().is_none());
    }
}

// =============================================================================
// Seller accounts contract
// =============================================================================

fn new_seller(username: &str) -> Seller {
    Seller {
        id: 0,
        username: username.to_string(),
        email: format!("{username}@mall.test"),
        business_name: format!("{username} shop"),
        phone: None,
        address: None,
        role: SellerRole::Seller,
        status: SellerStatus::Pending,
        verified: false,
        created_at: Some(1_700_000_000),
    }
}

#[test]
fn test_seller_accounts() {
    for store in backends() {
        let name = store.backend_name();

        let created = store.insert_seller(new_seller("bamenda_tech")).unwrap();
        assert_eq!(created.id, 4, "{name}");
        assert_eq!(
            store.find_seller_by_username("bamenda_tech").unwrap(),
            Some(created.clone())
        );
        assert_eq!(
            store.find_seller_by_email("bamenda_tech@mall.test").unwrap(),
            Some(created.clone())
        );

        let duplicate = store.insert_seller(new_seller("bamenda_tech")).unwrap_err();
        assert!(matches!(duplicate, StoreError::Conflict(_)), "{name}");

        let listed: Vec<u64> = store.list_sellers().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![4, 3, 2, 1], "{name}");

        let active = store.update_status(4, SellerStatus::Active).unwrap().unwrap();
        assert_eq!(active.status, SellerStatus::Active);
        let admin = store.make_admin(4).unwrap().unwrap();
        assert_eq!(admin.role, SellerRole::Admin);

        let profile = catalog_data::SellerProfile {
            business_name: "Bamenda Tech Hub".to_string(),
            phone: Some("+237 650 000 000".to_string()),
            address: None,
        };
        let renamed = store.update_profile(4, profile).unwrap().unwrap();
        assert_eq!(renamed.business_name, "Bamenda Tech Hub");
        assert_eq!(renamed.status, SellerStatus::Active);

        assert!(store.update_status(99, SellerStatus::Suspended).unwrap().is_none());
        assert!(store.find_seller(99).unwrap().is_none());
    }
}

#[test]
fn test_import_rejects_dangling_seller() {
    for store in backends() {
        let mut seed = CatalogSeed::default();
        let mut orphan = extra(50, "Orphan", "Phones", 1.0);
        orphan.seller_id = 77;
        seed.products.push(orphan);

        let err = store.import(seed).unwrap_err();
        assert!(matches!(err, StoreError::Data(_)), "{}", store.backend_name());
    }
}
