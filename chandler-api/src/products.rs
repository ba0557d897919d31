use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use chandler_catalog::product::{Product, SupplierProduct};
use chandler_core::{DomainError, Page, PageParams};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", post(create_product).get(list_products))
        .route(
            "/v1/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route(
            "/v1/supplier-products",
            post(create_supplier_product).get(list_supplier_products),
        )
        .route("/v1/supplier-products/{id}", patch(reprice_supplier_product))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub impa_code: Option<String>,
    pub unit_of_measure: String,
}

/// PATCH body. Double options distinguish "leave alone" from "clear".
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub version: i64,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub impa_code: Option<Option<String>>,
    pub unit_of_measure: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierProductRequest {
    pub product_id: Uuid,
    pub unit_price: Decimal,
    pub currency: String,
    pub lead_time_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RepriceRequest {
    pub version: i64,
    pub unit_price: Decimal,
    pub lead_time_days: Option<u32>,
}

async fn fetch_product(state: &AppState, id: Uuid) -> Result<Product, ApiError> {
    Ok(state
        .catalog
        .get_product(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("product {id}")))?)
}

/// POST /v1/products
async fn create_product(
    State(state): State<AppState>,
    Identity(_actor): Identity,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = Product::new(req.name, req.description, req.impa_code, req.unit_of_measure)?;
    let product = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /v1/products
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Page<Product>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(Page::slice(
        products,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(fetch_product(&state, id).await?))
}

/// PATCH /v1/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Identity(_actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let mut product = fetch_product(&state, id).await?;
    product.apply_update(
        req.version,
        req.name,
        req.description,
        req.impa_code,
        req.unit_of_measure,
    )?;
    Ok(Json(state.catalog.update_product(product).await?))
}

/// DELETE /v1/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Identity(_actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/supplier-products
async fn create_supplier_product(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateSupplierProductRequest>,
) -> Result<(StatusCode, Json<SupplierProduct>), ApiError> {
    actor.ensure_supplier()?;
    let listing = SupplierProduct::new(
        actor.organization_id,
        req.product_id,
        req.unit_price,
        req.currency,
        req.lead_time_days,
    )?;
    let listing = state.catalog.create_supplier_product(listing).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /v1/supplier-products
///
/// The calling supplier's own listings.
async fn list_supplier_products(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Page<SupplierProduct>>, ApiError> {
    actor.ensure_supplier()?;
    let listings = state.catalog.list_supplier_products(actor.organization_id).await?;
    Ok(Json(Page::slice(
        listings,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// PATCH /v1/supplier-products/{id}
async fn reprice_supplier_product(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RepriceRequest>,
) -> Result<Json<SupplierProduct>, ApiError> {
    actor.ensure_supplier()?;
    let mut listing = state
        .catalog
        .list_supplier_products(actor.organization_id)
        .await?
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| DomainError::not_found(format!("supplier product {id}")))?;
    listing.reprice(req.version, req.unit_price, req.lead_time_days)?;
    Ok(Json(state.catalog.update_supplier_product(listing).await?))
}
