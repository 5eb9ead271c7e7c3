//! Server configuration: defaults, an optional TOML file, then `MALL__*`
//! environment overrides (e.g. `MALL__STORE__BACKEND=sqlite`).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use store::StoreSettings;

use crate::catalog_service::CatalogSettings;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "mall-server", version, about = "Marketplace catalog HTTP server")]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub store: StoreSettings,
    pub catalog: CatalogSettings,
}

impl Settings {
    /// Load settings from an optional TOML file, with sane defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = CatalogSettings::default();
        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("store.backend", "memory")?
            .set_default("catalog.price_ceiling", defaults.price_ceiling)?
            .set_default("catalog.suggestion_limit", defaults.suggestion_limit as u64)?
            .set_default("catalog.featured_limit", defaults.featured_limit as u64)?
            .set_default("catalog.related_limit", defaults.related_limit as u64)?
            .set_default("catalog.query_timeout_ms", defaults.query_timeout_ms)?
            .set_default("catalog.max_plausible_discount", defaults.max_plausible_discount)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let cfg = builder
            .add_source(Environment::with_prefix("MALL").separator("__"))
            .build()?;

        cfg.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
