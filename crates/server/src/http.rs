//! HTTP transport: maps requests onto `CatalogService` operations.
//!
//! ## Routes
//!
//! - `GET /health`
//! - `GET /api/products`: catalog API (`category`, `brand`, `search`,
//!   `minPrice`, `maxPrice`, `minRating`, `inStock`, `sort`)
//! - `GET /api/products/featured`, `GET /api/products/:id`
//! - `GET /api/search?q=`: inline suggestions
//! - `POST /sellers`: seller registration
//! - `/seller/...`: the signed-in seller's dashboard
//! - `/admin/...`: moderation, admin sessions only
//!
//! The session comes from the `x-seller-id`, `x-seller-role` and
//! `x-seller-status` headers set by the session layer in front of this
//! service. Errors are `{ "success": false, "message": ... }` with the
//! status from `ServiceError::status_code`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use catalog_data::{ProductId, SellerId, SellerProfile, SellerRegistration};
use query_engine::CatalogParams;
use store::{ProductDraft, SellerListing};

use crate::access::Session;
use crate::catalog_service::CatalogService;
use crate::error::ServiceError;

pub const SELLER_ID_HEADER: &str = "x-seller-id";
pub const SELLER_ROLE_HEADER: &str = "x-seller-role";
pub const SELLER_STATUS_HEADER: &str = "x-seller-status";

type AppState = State<Arc<CatalogService>>;
type ApiResult = Result<Json<Value>, ServiceError>;

/// Build the axum `Router` for the given service.
pub fn router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/products", get(catalog_handler))
        .route("/api/products/featured", get(featured_handler))
        .route("/api/products/:id", get(details_handler))
        .route("/api/search", get(search_handler))
        .route("/sellers", post(register_handler))
        .route(
            "/seller/products",
            get(seller_products_handler).post(create_product_handler),
        )
        .route(
            "/seller/products/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/seller/stats", get(seller_stats_handler))
        .route(
            "/seller/profile",
            get(profile_handler).put(update_profile_handler),
        )
        .route("/admin/overview", get(admin_overview_handler))
        .route("/admin/sellers", get(list_sellers_handler))
        .route("/admin/sellers/:id/suspend", post(suspend_seller_handler))
        .route("/admin/sellers/:id/verify", post(verify_seller_handler))
        .route(
            "/admin/products/:id",
            axum::routing::delete(admin_delete_product_handler),
        )
        .with_state(service)
}

/// Serve the service over HTTP at the given address.
pub async fn serve(service: Arc<CatalogService>, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = json!({ "success": false, "message": self.to_string() });
        if !self.field_errors().is_empty() {
            body["errors"] = json!(self.field_errors());
        }
        (status, Json(body)).into_response()
    }
}

/// Extract the session from the session layer's headers.
fn session_from_headers(headers: &HeaderMap) -> Session {
    let var = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    Session::from_vars(
        var(SELLER_ID_HEADER),
        var(SELLER_ROLE_HEADER),
        var(SELLER_STATUS_HEADER),
    )
}

// ============================================================================
// Public catalog
// ============================================================================

async fn health_handler(State(service): AppState) -> impl IntoResponse {
    Json(json!({ "ok": true, "backend": service.backend_name() }))
}

async fn catalog_handler(
    State(service): AppState,
    Query(params): Query<CatalogParams>,
) -> impl IntoResponse {
    let response = service.query_catalog(params).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

async fn featured_handler(State(service): AppState) -> ApiResult {
    let products = service.featured().await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

async fn details_handler(State(service): AppState, Path(id): Path<ProductId>) -> ApiResult {
    let details = service
        .product_details(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {id}")))?;
    Ok(Json(json!({
        "success": true,
        "product": details.product,
        "related": details.related,
    })))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(service): AppState,
    Query(params): Query<SearchParams>,
) -> ApiResult {
    let suggestions = service.suggest(&params.q).await?;
    Ok(Json(json!({ "success": true, "suggestions": suggestions })))
}

async fn register_handler(
    State(service): AppState,
    Json(registration): Json<SellerRegistration>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let seller = service.register_seller(registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful! You can now log in.",
            "seller": seller,
        })),
    ))
}

// ============================================================================
// Seller dashboard
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListingParams {
    status: Option<String>,
    search: Option<String>,
}

async fn seller_products_handler(
    State(service): AppState,
    headers: HeaderMap,
    Query(params): Query<ListingParams>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let listing = SellerListing::from_params(params.status.as_deref(), params.search);
    let products = service.seller_products(&session, listing).await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

async fn create_product_handler(
    State(service): AppState,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let session = session_from_headers(&headers);
    let product = service.create_product(&session, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created successfully",
            "product": product,
        })),
    ))
}

async fn get_product_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let product = service.get_product(&session, id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

async fn update_product_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let product = service.update_product(&session, id, draft).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product updated successfully",
        "product": product,
    })))
}

async fn delete_product_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    service.delete_product(&session, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

async fn seller_stats_handler(State(service): AppState, headers: HeaderMap) -> ApiResult {
    let session = session_from_headers(&headers);
    let stats = service.seller_stats(&session).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

async fn profile_handler(State(service): AppState, headers: HeaderMap) -> ApiResult {
    let session = session_from_headers(&headers);
    let seller = service.profile(&session).await?;
    Ok(Json(json!({ "success": true, "seller": seller })))
}

async fn update_profile_handler(
    State(service): AppState,
    headers: HeaderMap,
    Json(profile): Json<SellerProfile>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let seller = service.update_profile(&session, profile).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "seller": seller,
    })))
}

// ============================================================================
// Admin
// ============================================================================

async fn admin_overview_handler(State(service): AppState, headers: HeaderMap) -> ApiResult {
    let session = session_from_headers(&headers);
    let stats = service.admin_overview(&session).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

async fn list_sellers_handler(State(service): AppState, headers: HeaderMap) -> ApiResult {
    let session = session_from_headers(&headers);
    let users = service.list_sellers(&session).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

async fn suspend_seller_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<SellerId>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let seller = service.suspend_seller(&session, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User suspended successfully",
        "seller": seller,
    })))
}

async fn verify_seller_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<SellerId>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    let seller = service.activate_seller(&session, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User activated successfully",
        "seller": seller,
    })))
}

async fn admin_delete_product_handler(
    State(service): AppState,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> ApiResult {
    let session = session_from_headers(&headers);
    service.admin_delete_product(&session, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}
