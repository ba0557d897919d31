use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use chandler_core::{DomainError, Page, PageParams};
use chandler_order::dispute::{Dispute, DisputeComment, DisputeType};
use chandler_shared::models::events::{DisputeOpenedEvent, DisputeResolvedEvent, DomainEvent};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/disputes", post(open_dispute).get(list_disputes))
        .route("/v1/disputes/{id}", get(get_dispute))
        .route("/v1/disputes/{id}/assign", post(assign))
        .route("/v1/disputes/{id}/request-response", post(request_response))
        .route("/v1/disputes/{id}/resolve", post(resolve))
        .route("/v1/disputes/{id}/escalate", post(escalate))
        .route("/v1/disputes/{id}/close", post(close))
        .route("/v1/disputes/{id}/comments", post(add_comment))
}

#[derive(Debug, Deserialize)]
pub struct OpenDisputeRequest {
    pub order_id: Uuid,
    pub delivery_id: Option<Uuid>,
    pub dispute_type: DisputeType,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ListDisputesQuery {
    pub order_id: Option<Uuid>,
    pub delivery_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub reviewer_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resolution: String,
}

#[derive(Debug, Deserialize)]
pub struct EscalateRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

async fn fetch_dispute(state: &AppState, id: Uuid) -> Result<Dispute, ApiError> {
    Ok(state
        .disputes
        .get_dispute(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("dispute {id}")))?)
}

/// POST /v1/disputes
///
/// Open a dispute directly against an order, without going through the
/// delivery review path (pricing and late-delivery cases).
async fn open_dispute(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(req): Json<OpenDisputeRequest>,
) -> Result<(StatusCode, Json<Dispute>), ApiError> {
    let order = state
        .orders
        .get_order(req.order_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("order {}", req.order_id)))?;
    // Either commercial party may raise a dispute.
    if actor.ensure_owns(order.buyer_organization_id).is_err() {
        let vendor_orders = state
            .orders
            .list_vendor_orders(Some(order.id), Some(actor.organization_id))
            .await?;
        if vendor_orders.is_empty() {
            return Err(DomainError::authorization(
                "only a party to the order can raise a dispute",
            )
            .into());
        }
    }
    if let Some(delivery_id) = req.delivery_id {
        let delivery = state
            .deliveries
            .get_delivery(delivery_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("delivery {delivery_id}")))?;
        if delivery.order_id != order.id {
            return Err(DomainError::validation(
                "delivery_id",
                "delivery does not belong to the disputed order",
            )
            .into());
        }
    }

    let now = Utc::now();
    let dispute = Dispute::open(
        req.order_id,
        req.delivery_id,
        req.dispute_type,
        req.description,
        actor.organization_id,
        now,
    )?;
    let dispute = state.disputes.create_dispute(dispute).await?;

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

/// GET /v1/disputes
async fn list_disputes(
    State(state): State<AppState>,
    Query(query): Query<ListDisputesQuery>,
) -> Result<Json<Page<Dispute>>, ApiError> {
    let disputes = state.disputes.list_disputes(query.order_id, query.delivery_id).await?;
    Ok(Json(Page::slice(
        disputes,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/disputes/{id}
async fn get_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Dispute>, ApiError> {
    Ok(Json(fetch_dispute(&state, id).await?))
}

/// POST /v1/disputes/{id}/assign
async fn assign(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Dispute>, ApiError> {
    actor.ensure_reviewer()?;
    let mut dispute = fetch_dispute(&state, id).await?;
    dispute.assign(req.reviewer_id, Utc::now())?;
    Ok(Json(state.disputes.update_dispute(dispute).await?))
}

/// POST /v1/disputes/{id}/request-response
async fn request_response(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Dispute>, ApiError> {
    actor.ensure_reviewer()?;
    let mut dispute = fetch_dispute(&state, id).await?;
    dispute.request_response(Utc::now())?;
    Ok(Json(state.disputes.update_dispute(dispute).await?))
}

/// POST /v1/disputes/{id}/resolve
async fn resolve(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<Dispute>, ApiError> {
    actor.ensure_reviewer()?;
    let mut dispute = fetch_dispute(&state, id).await?;
    let now = Utc::now();
    dispute.resolve(&req.resolution, now)?;
    let dispute = state.disputes.update_dispute(dispute).await?;

    state.bus.publish(DomainEvent::DisputeResolved(DisputeResolvedEvent {
        dispute_id: dispute.id,
        order_id: dispute.order_id,
        resolution: req.resolution,
        occurred_at: now,
    }));
    Ok(Json(dispute))
}

/// POST /v1/disputes/{id}/escalate
async fn escalate(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<EscalateRequest>,
) -> Result<Json<Dispute>, ApiError> {
    actor.ensure_reviewer()?;
    let mut dispute = fetch_dispute(&state, id).await?;
    dispute.escalate(&req.reason, Utc::now())?;
    Ok(Json(state.disputes.update_dispute(dispute).await?))
}

/// POST /v1/disputes/{id}/close
async fn close(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Dispute>, ApiError> {
    actor.ensure_reviewer()?;
    let mut dispute = fetch_dispute(&state, id).await?;
    dispute.close(Utc::now())?;
    Ok(Json(state.disputes.update_dispute(dispute).await?))
}

/// POST /v1/disputes/{id}/comments
async fn add_comment(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<DisputeComment>), ApiError> {
    let mut dispute = fetch_dispute(&state, id).await?;
    let comment = dispute
        .add_comment(actor.organization_id, req.body, req.attachments, Utc::now())?
        .clone();
    state.disputes.update_dispute(dispute).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
