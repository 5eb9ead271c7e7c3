//! Backend selection, done once at startup.

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;
use crate::traits::Store;
use catalog_data::parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: Backend,
    /// SQLite database file; in-memory database when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// JSON seed imported after opening
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

/// Open the configured backend and import the seed, if any.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match settings.backend {
        Backend::Memory => Arc::new(MemoryStore::new()),
        Backend::Sqlite => match &settings.path {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(SqliteStore::open_in_memory()?),
        },
    };

    if let Some(seed_path) = &settings.seed {
        let seed = parser::parse_seed(seed_path)?;
        store.import(seed)?;
    }

    info!("Store ready (backend: {})", store.backend_name());
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use query_engine::CatalogQuery;
    use std::path::Path;

    fn seed_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/catalog.json")
    }

    #[test]
    fn test_open_each_backend_with_seed() {
        for backend in [Backend::Memory, Backend::Sqlite] {
            let store = open_store(&StoreSettings {
                backend,
                path: None,
                seed: Some(seed_path()),
            })
            .unwrap();

            let all = store.list_published(&CatalogQuery::default(), None).unwrap();
            assert_eq!(all.len(), 9, "backend {}", store.backend_name());
        }
    }

    #[test]
    fn test_missing_seed_is_an_error() {
        let err = open_store(&StoreSettings {
            backend: Backend::Memory,
            path: None,
            seed: Some(PathBuf::from("no/such/seed.json")),
        })
        .err()
        .unwrap();
        assert!(matches!(err, StoreError::Data(_)));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sqlite".parse::<Backend>(), Ok(Backend::Sqlite));
        assert!("postgres".parse::<Backend>().is_err());
    }
}
