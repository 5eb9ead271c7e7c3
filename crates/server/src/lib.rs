//! # Marketplace Server
//!
//! Public catalog, seller dashboard and admin operations over a `Store`,
//! served over HTTP.
//!
//! ## Main Components
//!
//! - **catalog_service**: `CatalogService`, every operation the server offers
//! - **access**: Session roles and the seller/admin checks
//! - **validation**: Profile and product form checks
//! - **latest**: Last-request-wins rendering of overlapping queries
//! - **http**: axum router and `serve`
//! - **settings**: File and environment configuration

pub mod access;
pub mod catalog_service;
pub mod error;
pub mod http;
pub mod latest;
pub mod settings;
pub mod validation;

pub use access::{require_admin, require_seller, Session};
pub use catalog_service::{
    AdminOverview, CatalogResponse, CatalogService, CatalogSettings, ProductCard, ProductDetails,
};
pub use error::{Result, ServiceError};
pub use latest::{LatestQuery, Outcome, RenderedState, Ticket};
pub use settings::Settings;
pub use validation::FieldError;
