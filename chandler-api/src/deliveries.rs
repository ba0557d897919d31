use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use chandler_core::{DomainError, Page, PageParams};
use chandler_order::delivery::{Delivery, DeliveryStatus, ProofOfDelivery, RecordedQuantity};
use chandler_order::dispute::{Dispute, DisputeType};
use chandler_order::models::{VendorOrder, VendorOrderStatus};
use chandler_shared::models::events::{
    DeliveryRecordedEvent, DeliveryReviewedEvent, DisputeOpenedEvent, DomainEvent,
};
use chandler_shared::pii::Masked;

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vendor-orders/{id}/deliveries", post(create_delivery))
        .route("/v1/deliveries", get(list_deliveries))
        .route("/v1/deliveries/{id}", get(get_delivery))
        .route("/v1/deliveries/{id}/dispatch", post(dispatch))
        .route("/v1/deliveries/{id}/in-transit", post(mark_in_transit))
        .route("/v1/deliveries/{id}/record", post(record))
        .route("/v1/deliveries/{id}/accept", post(accept))
        .route("/v1/deliveries/{id}/dispute", post(dispute))
        .route("/v1/deliveries/{id}/reject", post(reject))
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub fulfillment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RecordedLineRequest {
    pub order_line_item_id: Uuid,
    pub quantity_delivered: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ProofOfDeliveryRequest {
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_accuracy_meters: Option<f64>,
    pub receiver_name: String,
    pub receiver_designation: Option<String>,
    pub signature_ref: Option<String>,
    #[serde(default)]
    pub photo_refs: Vec<String>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RecordDeliveryRequest {
    pub items: Vec<RecordedLineRequest>,
    pub proof_of_delivery: ProofOfDeliveryRequest,
}

#[derive(Debug, Deserialize)]
pub struct AcceptedLineRequest {
    pub order_line_item_id: Uuid,
    pub quantity_accepted: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AcceptDeliveryRequest {
    pub items: Vec<AcceptedLineRequest>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisputeDeliveryRequest {
    pub reason: String,
    pub dispute_type: DisputeType,
}

#[derive(Debug, Deserialize)]
pub struct RejectDeliveryRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ListDeliveriesQuery {
    pub vendor_order_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn fetch_delivery(state: &AppState, id: Uuid) -> Result<Delivery, ApiError> {
    Ok(state
        .deliveries
        .get_delivery(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("delivery {id}")))?)
}

/// Suppliers may only act on deliveries of their own vendor orders. Returns
/// the vendor order so handlers that touch it do not fetch twice.
async fn ensure_supplier_owns_delivery(
    state: &AppState,
    actor: &chandler_core::Actor,
    delivery: &Delivery,
) -> Result<VendorOrder, ApiError> {
    actor.ensure_supplier()?;
    let vendor_order = state
        .orders
        .get_vendor_order(delivery.vendor_order_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(format!("vendor order {}", delivery.vendor_order_id))
        })?;
    actor.ensure_owns(vendor_order.supplier_organization_id)?;
    Ok(vendor_order)
}

async fn ensure_buyer_owns_delivery(
    state: &AppState,
    actor: &chandler_core::Actor,
    delivery: &Delivery,
) -> Result<(), ApiError> {
    actor.ensure_buyer()?;
    let order = state
        .orders
        .get_order(delivery.order_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("order {}", delivery.order_id)))?;
    actor.ensure_owns(order.buyer_organization_id)?;
    Ok(())
}

/// POST /v1/vendor-orders/{id}/deliveries
///
/// Open a delivery leg covering every line of the vendor order. The vendor
/// order must already be in motion.
async fn create_delivery(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(vendor_order_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Delivery>), ApiError> {
    actor.ensure_supplier()?;
    let vendor_order = state
        .orders
        .get_vendor_order(vendor_order_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("vendor order {vendor_order_id}")))?;
    actor.ensure_owns(vendor_order.supplier_organization_id)?;
    if !matches!(
        vendor_order.status,
        VendorOrderStatus::Confirmed | VendorOrderStatus::Processing | VendorOrderStatus::Shipped
    ) {
        return Err(DomainError::conflict(format!(
            "deliveries can only be opened for a confirmed vendor order (current status {})",
            vendor_order.status
        ))
        .into());
    }
    let delivery = Delivery::new(&vendor_order, Utc::now());
    let delivery = state.deliveries.create_delivery(delivery).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// GET /v1/deliveries
async fn list_deliveries(
    State(state): State<AppState>,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<Json<Page<Delivery>>, ApiError> {
    let deliveries = state.deliveries.list_deliveries(query.vendor_order_id).await?;
    Ok(Json(Page::slice(
        deliveries,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/deliveries/{id}
async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, ApiError> {
    Ok(Json(fetch_delivery(&state, id).await?))
}

/// POST /v1/deliveries/{id}/dispatch
async fn dispatch(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<DispatchRequest>,
) -> Result<Json<Delivery>, ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    ensure_supplier_owns_delivery(&state, &actor, &delivery).await?;
    delivery.dispatch(req.fulfillment_id, Utc::now())?;
    Ok(Json(state.deliveries.update_delivery(delivery).await?))
}

/// POST /v1/deliveries/{id}/in-transit
async fn mark_in_transit(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    ensure_supplier_owns_delivery(&state, &actor, &delivery).await?;
    delivery.mark_in_transit(Utc::now())?;
    Ok(Json(state.deliveries.update_delivery(delivery).await?))
}

/// POST /v1/deliveries/{id}/record
///
/// Record delivered quantities and the proof of delivery captured at the
/// quay. Moves the vendor order to DELIVERED as well.
async fn record(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordDeliveryRequest>,
) -> Result<Json<Delivery>, ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    let mut vendor_order = ensure_supplier_owns_delivery(&state, &actor, &delivery).await?;
    let now = Utc::now();

    let quantities: Vec<RecordedQuantity> = req
        .items
        .iter()
        .map(|item| RecordedQuantity {
            order_line_item_id: item.order_line_item_id,
            quantity_delivered: item.quantity_delivered,
        })
        .collect();
    let proof = ProofOfDelivery {
        gps_latitude: req.proof_of_delivery.gps_latitude,
        gps_longitude: req.proof_of_delivery.gps_longitude,
        gps_accuracy_meters: req.proof_of_delivery.gps_accuracy_meters,
        receiver_name: Masked(req.proof_of_delivery.receiver_name),
        receiver_designation: req.proof_of_delivery.receiver_designation,
        signature_ref: req.proof_of_delivery.signature_ref,
        photo_refs: req.proof_of_delivery.photo_refs,
        delivered_at: req.proof_of_delivery.delivered_at.unwrap_or(now),
    };
    delivery.record(&quantities, proof, now)?;
    let delivery = state.deliveries.update_delivery(delivery).await?;

    // The vendor order follows the first recorded delivery.
    if vendor_order.status == VendorOrderStatus::Shipped {
        vendor_order.mark_delivered(now)?;
        state.orders.update_vendor_order(vendor_order).await?;
    }

    state.bus.publish(DomainEvent::DeliveryRecorded(DeliveryRecordedEvent {
        delivery_id: delivery.id,
        order_id: delivery.order_id,
        vendor_order_id: delivery.vendor_order_id,
        occurred_at: now,
    }));
    Ok(Json(delivery))
}

/// POST /v1/deliveries/{id}/accept
async fn accept(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<AcceptDeliveryRequest>,
) -> Result<Json<Delivery>, ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    ensure_buyer_owns_delivery(&state, &actor, &delivery).await?;

    let accepted: Vec<(Uuid, Decimal)> = req
        .items
        .iter()
        .map(|item| (item.order_line_item_id, item.quantity_accepted))
        .collect();
    let now = Utc::now();
    delivery.accept(&accepted, req.note, now)?;
    let delivery = state.deliveries.update_delivery(delivery).await?;

    state.bus.publish(DomainEvent::DeliveryReviewed(DeliveryReviewedEvent {
        delivery_id: delivery.id,
        order_id: delivery.order_id,
        vendor_order_id: delivery.vendor_order_id,
        outcome: DeliveryStatus::Accepted.to_string(),
        occurred_at: now,
    }));
    Ok(Json(delivery))
}

/// POST /v1/deliveries/{id}/dispute
///
/// Mark the delivery disputed and open the dispute record in one step.
async fn dispute(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<DisputeDeliveryRequest>,
) -> Result<(StatusCode, Json<Dispute>), ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    ensure_buyer_owns_delivery(&state, &actor, &delivery).await?;

    let now = Utc::now();
    delivery.dispute(&req.reason, now)?;
    let dispute = Dispute::open(
        delivery.order_id,
        Some(delivery.id),
        req.dispute_type,
        req.reason,
        actor.organization_id,
        now,
    )?;
    let delivery = state.deliveries.update_delivery(delivery).await?;
    let dispute = state.disputes.create_dispute(dispute).await?;

    state.bus.publish(DomainEvent::DeliveryReviewed(DeliveryReviewedEvent {
        delivery_id: delivery.id,
        order_id: delivery.order_id,
        vendor_order_id: delivery.vendor_order_id,
        outcome: DeliveryStatus::Disputed.to_string(),
        occurred_at: now,
    }));
    state.bus.publish(DomainEvent::DisputeOpened(DisputeOpenedEvent {
        dispute_id: dispute.id,
        order_id: dispute.order_id,
        delivery_id: dispute.delivery_id,
        dispute_type: dispute.dispute_type.to_string(),
        raised_by: dispute.raised_by,
        occurred_at: now,
    }));
    Ok((StatusCode::CREATED, Json(dispute)))
}

/// POST /v1/deliveries/{id}/reject
async fn reject(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectDeliveryRequest>,
) -> Result<Json<Delivery>, ApiError> {
    let mut delivery = fetch_delivery(&state, id).await?;
    ensure_buyer_owns_delivery(&state, &actor, &delivery).await?;

    let now = Utc::now();
    delivery.reject(&req.reason, now)?;
    let delivery = state.deliveries.update_delivery(delivery).await?;

    state.bus.publish(DomainEvent::DeliveryReviewed(DeliveryReviewedEvent {
        delivery_id: delivery.id,
        order_id: delivery.order_id,
        vendor_order_id: delivery.vendor_order_id,
        outcome: DeliveryStatus::Rejected.to_string(),
        occurred_at: now,
    }));
    Ok(Json(delivery))
}
