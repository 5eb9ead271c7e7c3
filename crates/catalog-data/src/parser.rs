//! Parser for catalog seed files.
//!
//! A seed is a single JSON document:
//!
//! ```json
//! { "sellers": [ { "id": 1, "username": "kamer", ... } ],
//!   "products": [ { "id": 1, "seller_id": 1, "name": "iPhone 13 Pro", ... } ] }
//! ```

use crate::error::{CatalogDataError, Result};
use crate::types::CatalogSeed;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read and decode a seed file.
pub fn parse_seed(path: &Path) -> Result<CatalogSeed> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogDataError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogDataError::IoError(e),
    })?;

    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_seed_str(&content, &file)
}

/// Decode a seed document held in memory. `file` is only used for error context.
pub fn parse_seed_str(content: &str, file: &str) -> Result<CatalogSeed> {
    serde_json::from_str(content).map_err(|e| CatalogDataError::ParseError {
        file: file.to_string(),
        line: e.line(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductStatus, SellerRole};
    use std::io::Write;

    const SEED: &str = r#"{
        "sellers": [
            { "id": 1, "username": "kamer", "email": "shop@kamer.test",
              "business_name": "Kamer Tech", "role": "admin", "status": "active" }
        ],
        "products": [
            { "id": 1, "seller_id": 1, "name": "iPhone 13 Pro", "category": "Phones",
              "brand": "Apple", "price": 879.99, "original_price": 1099.99,
              "rating": 4.5, "review_count": 128, "quantity": 3, "status": "published" },
            { "id": 2, "seller_id": 1, "name": "Draft Listing", "category": "Phones",
              "price": 10.0 }
        ]
    }"#;

    #[test]
    fn test_parse_seed_str() {
        let seed = parse_seed_str(SEED, "catalog.json").unwrap();

        assert_eq!(seed.sellers.len(), 1);
        assert_eq!(seed.sellers[0].role, SellerRole::Admin);
        assert_eq!(seed.products.len(), 2);

        let iphone = &seed.products[0];
        assert_eq!(iphone.original_price, Some(1099.99));
        assert!(iphone.is_published());
        assert!(iphone.in_stock());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let seed = parse_seed_str(SEED, "catalog.json").unwrap();
        let draft = &seed.products[1];

        assert_eq!(draft.status, ProductStatus::Draft);
        assert!(draft.is_active);
        assert_eq!(draft.quantity, 0);
        assert!(!draft.in_stock());
        assert_eq!(draft.brand, None);
        assert_eq!(draft.created_at, None);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let broken = "{\n  \"sellers\": [\n    { \"id\": \"not-a-number\" }\n  ]\n}";
        let err = parse_seed_str(broken, "broken.json").unwrap_err();

        match err {
            CatalogDataError::ParseError { file, line, .. } => {
                assert_eq!(file, "broken.json");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let seed = parse_seed(file.path()).unwrap();
        assert_eq!(seed.products.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_seed(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, CatalogDataError::FileNotFound { .. }));
    }
}
