use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use chandler_core::{ActorRole, DomainError, Page, PageParams};
use chandler_order::models::{Order, VendorOrder};
use chandler_order::settlement::{self, SettlementStatement};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/vendor-orders", get(list_vendor_orders_for_order))
        .route("/v1/vendor-orders", get(list_vendor_orders))
        .route("/v1/vendor-orders/{id}", get(get_vendor_order))
        .route("/v1/vendor-orders/{id}/confirm", post(confirm))
        .route("/v1/vendor-orders/{id}/start-processing", post(start_processing))
        .route("/v1/vendor-orders/{id}/ship", post(ship))
        .route("/v1/vendor-orders/{id}/complete", post(complete))
        .route("/v1/vendor-orders/{id}/cancel", post(cancel))
        .route("/v1/vendor-orders/{id}/settlement", get(settlement_statement))
}

async fn fetch_order(state: &AppState, id: Uuid) -> Result<Order, ApiError> {
    Ok(state
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("order {id}")))?)
}

async fn fetch_vendor_order(state: &AppState, id: Uuid) -> Result<VendorOrder, ApiError> {
    Ok(state
        .orders
        .get_vendor_order(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("vendor order {id}")))?)
}

/// Re-derive the parent order status after a vendor order changed.
async fn refresh_parent_order(state: &AppState, order_id: Uuid) -> Result<(), ApiError> {
    let mut order = fetch_order(state, order_id).await?;
    let vendor_orders = state.orders.list_vendor_orders(Some(order_id), None).await?;
    if order.refresh_status(&vendor_orders, Utc::now()) {
        state.orders.update_order(order).await?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOrdersQuery {
    fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// GET /v1/orders
async fn list_orders(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Page<Order>>, ApiError> {
    actor.ensure_buyer()?;
    let filter = match actor.role {
        ActorRole::System => None,
        _ => Some(actor.organization_id),
    };
    let orders = state.orders.list_orders(filter).await?;
    Ok(Json(Page::slice(
        orders,
        query.page(),
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = fetch_order(&state, id).await?;
    if actor.role == ActorRole::Buyer {
        actor.ensure_owns(order.buyer_organization_id)?;
    }
    Ok(Json(order))
}

/// GET /v1/orders/{id}/vendor-orders
async fn list_vendor_orders_for_order(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Page<VendorOrder>>, ApiError> {
    let order = fetch_order(&state, id).await?;
    if actor.role == ActorRole::Buyer {
        actor.ensure_owns(order.buyer_organization_id)?;
    }
    let vendor_orders = state.orders.list_vendor_orders(Some(id), None).await?;
    Ok(Json(Page::slice(
        vendor_orders,
        query.page(),
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ListVendorOrdersQuery {
    pub order_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /v1/vendor-orders
///
/// A supplier's worklist: every vendor order addressed to them.
async fn list_vendor_orders(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListVendorOrdersQuery>,
) -> Result<Json<Page<VendorOrder>>, ApiError> {
    actor.ensure_supplier()?;
    let supplier_filter = match actor.role {
        ActorRole::System => None,
        _ => Some(actor.organization_id),
    };
    let vendor_orders = state.orders.list_vendor_orders(query.order_id, supplier_filter).await?;
    Ok(Json(Page::slice(
        vendor_orders,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/vendor-orders/{id}
async fn get_vendor_order(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    let vendor_order = fetch_vendor_order(&state, id).await?;
    ensure_party(&state, &actor, &vendor_order).await?;
    Ok(Json(vendor_order))
}

/// Buyers must own the parent order; suppliers must be the addressee.
async fn ensure_party(
    state: &AppState,
    actor: &chandler_core::Actor,
    vendor_order: &VendorOrder,
) -> Result<(), ApiError> {
    match actor.role {
        ActorRole::Supplier => actor.ensure_owns(vendor_order.supplier_organization_id)?,
        ActorRole::Buyer => {
            let order = fetch_order(state, vendor_order.order_id).await?;
            actor.ensure_owns(order.buyer_organization_id)?;
        }
        _ => {}
    }
    Ok(())
}

/// POST /v1/vendor-orders/{id}/confirm
async fn confirm(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    actor.ensure_supplier()?;
    let mut vendor_order = fetch_vendor_order(&state, id).await?;
    actor.ensure_owns(vendor_order.supplier_organization_id)?;
    vendor_order.confirm(Utc::now())?;
    let vendor_order = state.orders.update_vendor_order(vendor_order).await?;
    refresh_parent_order(&state, vendor_order.order_id).await?;
    Ok(Json(vendor_order))
}

/// POST /v1/vendor-orders/{id}/start-processing
async fn start_processing(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    actor.ensure_supplier()?;
    let mut vendor_order = fetch_vendor_order(&state, id).await?;
    actor.ensure_owns(vendor_order.supplier_organization_id)?;
    vendor_order.start_processing(Utc::now())?;
    let vendor_order = state.orders.update_vendor_order(vendor_order).await?;
    refresh_parent_order(&state, vendor_order.order_id).await?;
    Ok(Json(vendor_order))
}

/// POST /v1/vendor-orders/{id}/ship
async fn ship(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    actor.ensure_supplier()?;
    let mut vendor_order = fetch_vendor_order(&state, id).await?;
    actor.ensure_owns(vendor_order.supplier_organization_id)?;
    let fulfillment = vendor_order.ship(Utc::now())?;
    tracing::info!(
        vendor_order_id = %id,
        reference = %fulfillment.reference,
        "vendor order shipped"
    );
    let vendor_order = state.orders.update_vendor_order(vendor_order).await?;
    refresh_parent_order(&state, vendor_order.order_id).await?;
    Ok(Json(vendor_order))
}

/// POST /v1/vendor-orders/{id}/complete
///
/// Requires an accepted delivery; closing the commercial loop without a
/// reviewed delivery would skip the receipt controls.
async fn complete(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    actor.ensure_buyer()?;
    let mut vendor_order = fetch_vendor_order(&state, id).await?;
    let order = fetch_order(&state, vendor_order.order_id).await?;
    actor.ensure_owns(order.buyer_organization_id)?;

    let deliveries = state.deliveries.list_deliveries(Some(id)).await?;
    let has_accepted = deliveries
        .iter()
        .any(|d| d.status == chandler_order::delivery::DeliveryStatus::Accepted);
    if !has_accepted {
        return Err(DomainError::conflict(
            "vendor order needs at least one accepted delivery before completion",
        )
        .into());
    }
    vendor_order.complete(Utc::now())?;
    let vendor_order = state.orders.update_vendor_order(vendor_order).await?;
    refresh_parent_order(&state, vendor_order.order_id).await?;
    Ok(Json(vendor_order))
}

/// POST /v1/vendor-orders/{id}/cancel
async fn cancel(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorOrder>, ApiError> {
    actor.ensure_buyer()?;
    let mut vendor_order = fetch_vendor_order(&state, id).await?;
    let order = fetch_order(&state, vendor_order.order_id).await?;
    actor.ensure_owns(order.buyer_organization_id)?;
    vendor_order.cancel(Utc::now())?;
    let vendor_order = state.orders.update_vendor_order(vendor_order).await?;
    refresh_parent_order(&state, vendor_order.order_id).await?;
    Ok(Json(vendor_order))
}

/// GET /v1/vendor-orders/{id}/settlement
///
/// Computed on demand from the current deliveries and disputes; never
/// persisted.
async fn settlement_statement(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<SettlementStatement>, ApiError> {
    let vendor_order = fetch_vendor_order(&state, id).await?;
    ensure_party(&state, &actor, &vendor_order).await?;
    let order = fetch_order(&state, vendor_order.order_id).await?;

    let deliveries = state.deliveries.list_deliveries(Some(id)).await?;
    let disputes = state.disputes.list_disputes(Some(order.id), None).await?;
    let statement = settlement::reconcile(
        &vendor_order,
        &order.currency,
        &deliveries,
        &disputes,
        state.business_rules.tax_rate_decimal(),
    );
    Ok(Json(statement))
}
