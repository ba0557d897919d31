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
use chandler_quote::ledger::{self, QuoteLineInput};
use chandler_quote::models::Quote;
use chandler_rfq::engine::Transition;
use chandler_rfq::invitation::Invitation;
use chandler_rfq::models::{Rfq, RfqLineItem, RfqStatus};
use chandler_shared::models::events::{DomainEvent, QuoteSubmittedEvent, RfqTransitionedEvent};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rfqs", post(create_rfq).get(list_rfqs))
        .route("/v1/rfqs/{id}", get(get_rfq).patch(update_rfq).delete(delete_rfq))
        .route("/v1/rfqs/{id}/line-items", post(add_line_item))
        .route(
            "/v1/rfqs/{id}/line-items/{item_id}",
            axum::routing::patch(update_line_item).delete(remove_line_item),
        )
        .route("/v1/rfqs/{id}/publish", post(publish))
        .route("/v1/rfqs/{id}/open-bidding", post(open_bidding))
        .route("/v1/rfqs/{id}/close-bidding", post(close_bidding))
        .route("/v1/rfqs/{id}/start-evaluation", post(start_evaluation))
        .route("/v1/rfqs/{id}/award", post(award))
        .route("/v1/rfqs/{id}/complete", post(complete))
        .route("/v1/rfqs/{id}/cancel", post(cancel))
        .route("/v1/rfqs/{id}/transitions", get(list_transitions))
        .route("/v1/rfqs/{id}/invitations", post(invite_supplier).get(list_invitations))
        .route("/v1/rfqs/{id}/invitations/respond", post(respond_to_invitation))
        .route("/v1/rfqs/{id}/quotes", post(submit_quote).get(list_quotes))
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRfqRequest {
    pub title: String,
    pub currency: String,
    pub vessel_name: Option<String>,
    pub delivery_port: String,
    pub delivery_date: Option<DateTime<Utc>>,
    pub bidding_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allow_partial_quotes: bool,
    #[serde(default = "default_true")]
    pub allow_quote_revision: bool,
    #[serde(default = "default_true")]
    pub require_all_line_items: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateRfqRequest {
    pub title: Option<String>,
    pub vessel_name: Option<Option<String>>,
    pub delivery_port: Option<String>,
    pub delivery_date: Option<Option<DateTime<Utc>>>,
    pub bidding_deadline: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_of_measure: String,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineItemRequest {
    pub version: i64,
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_of_measure: Option<String>,
    pub product_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct ListRfqsQuery {
    pub status: Option<RfqStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListRfqsQuery {
    fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteSupplierRequest {
    pub supplier_organization_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InvitationResponseRequest {
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuoteLineRequest {
    pub rfq_line_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuoteRequest {
    pub line_items: Vec<QuoteLineRequest>,
    /// Expected current version when revising an existing quote.
    pub version: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn fetch_rfq(state: &AppState, id: Uuid) -> Result<Rfq, ApiError> {
    Ok(state
        .rfqs
        .get_rfq(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("RFQ {id}")))?)
}

fn publish_transition(state: &AppState, transition: &Transition) {
    state.bus.publish(DomainEvent::RfqTransitioned(RfqTransitionedEvent {
        rfq_id: transition.rfq_id,
        from_status: transition.from_status.to_string(),
        to_status: transition.to_status.to_string(),
        transition_type: transition.transition_type.to_string(),
        triggered_by: transition.triggered_by,
        occurred_at: transition.occurred_at,
    }));
}

/// POST /v1/rfqs
async fn create_rfq(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateRfqRequest>,
) -> Result<(StatusCode, Json<Rfq>), ApiError> {
    actor.ensure_buyer()?;
    let rfq = Rfq::new(
        actor.organization_id,
        req.title,
        req.currency,
        req.vessel_name,
        req.delivery_port,
        req.delivery_date,
        req.bidding_deadline,
        req.allow_partial_quotes,
        req.allow_quote_revision,
        req.require_all_line_items,
    )?;
    let rfq = state.rfqs.create_rfq(rfq).await?;
    Ok((StatusCode::CREATED, Json(rfq)))
}

/// GET /v1/rfqs
async fn list_rfqs(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListRfqsQuery>,
) -> Result<Json<Page<Rfq>>, ApiError> {
    // Buyers see their own RFQs; suppliers browse everything visible.
    let buyer_filter = match actor.role {
        chandler_core::ActorRole::Buyer => Some(actor.organization_id),
        _ => None,
    };
    let rfqs = state.rfqs.list_rfqs(buyer_filter, query.status).await?;
    Ok(Json(Page::slice(
        rfqs,
        query.page(),
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/rfqs/{id}
async fn get_rfq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    Ok(Json(fetch_rfq(&state, id).await?))
}

/// PATCH /v1/rfqs/{id}
async fn update_rfq(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRfqRequest>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    rfq.ensure_metadata_editable()?;

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "title must not be empty").into());
        }
        rfq.title = title;
    }
    if let Some(vessel_name) = req.vessel_name {
        rfq.vessel_name = vessel_name;
    }
    if let Some(port) = req.delivery_port {
        if port.trim().is_empty() {
            return Err(
                DomainError::validation("delivery_port", "delivery port must not be empty").into(),
            );
        }
        rfq.delivery_port = port;
    }
    if let Some(delivery_date) = req.delivery_date {
        rfq.delivery_date = delivery_date;
    }
    if let Some(deadline) = req.bidding_deadline {
        rfq.bidding_deadline = deadline;
    }
    rfq.updated_at = Utc::now();
    Ok(Json(state.rfqs.update_rfq(rfq).await?))
}

/// DELETE /v1/rfqs/{id}
async fn delete_rfq(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    state.rfqs.delete_rfq(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/rfqs/{id}/line-items
async fn add_line_item(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<LineItemRequest>,
) -> Result<(StatusCode, Json<RfqLineItem>), ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    rfq.ensure_lines_editable()?;

    if let Some(product_id) = req.product_id {
        if state.catalog.get_product(product_id).await?.is_none() {
            return Err(DomainError::not_found(format!("product {product_id}")).into());
        }
    }
    let item = RfqLineItem::new(
        rfq.id,
        rfq.next_line_number(),
        req.description,
        req.quantity,
        req.unit_of_measure,
        req.product_id,
    )?;
    let created = item.clone();
    rfq.line_items.push(item);
    rfq.updated_at = Utc::now();
    state.rfqs.update_rfq(rfq).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /v1/rfqs/{id}/line-items/{item_id}
async fn update_line_item(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateLineItemRequest>,
) -> Result<Json<RfqLineItem>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    rfq.ensure_lines_editable()?;

    let item = rfq
        .line_items
        .iter_mut()
        .find(|item| item.id == item_id)
        .ok_or_else(|| DomainError::not_found(format!("line item {item_id}")))?;
    item.apply_update(
        req.version,
        req.description,
        req.quantity,
        req.unit_of_measure,
        req.product_id,
    )?;
    let updated = item.clone();
    rfq.updated_at = Utc::now();
    state.rfqs.update_rfq(rfq).await?;
    Ok(Json(updated))
}

/// DELETE /v1/rfqs/{id}/line-items/{item_id}
async fn remove_line_item(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    rfq.ensure_lines_editable()?;

    let before = rfq.line_items.len();
    rfq.line_items.retain(|item| item.id != item_id);
    if rfq.line_items.len() == before {
        return Err(DomainError::not_found(format!("line item {item_id}")).into());
    }
    rfq.updated_at = Utc::now();
    state.rfqs.update_rfq(rfq).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/rfqs/{id}/publish
async fn publish(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let transition = rfq.publish(&actor, Utc::now())?;
    let rfq = state.rfqs.update_rfq(rfq).await?;
    state.rfqs.append_transition(transition.clone()).await?;
    publish_transition(&state, &transition);
    Ok(Json(rfq))
}

/// POST /v1/rfqs/{id}/open-bidding
async fn open_bidding(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let transition = rfq.open_bidding(&actor, Utc::now())?;
    let rfq = state.rfqs.update_rfq(rfq).await?;
    state.rfqs.append_transition(transition.clone()).await?;
    publish_transition(&state, &transition);
    Ok(Json(rfq))
}

/// POST /v1/rfqs/{id}/close-bidding
async fn close_bidding(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let transition = rfq.close_bidding(&actor, Utc::now())?;
    let rfq = state.rfqs.update_rfq(rfq).await?;
    state.rfqs.append_transition(transition.clone()).await?;
    publish_transition(&state, &transition);
    Ok(Json(rfq))
}

/// POST /v1/rfqs/{id}/start-evaluation
async fn start_evaluation(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let submitted = state
        .quotes
        .list_quotes_for_rfq(id)
        .await?
        .iter()
        .filter(|quote| quote.status.is_awardable())
        .count();
    let transition = rfq.start_evaluation(submitted, &actor, Utc::now())?;
    let rfq = state.rfqs.update_rfq(rfq).await?;
    state.rfqs.append_transition(transition.clone()).await?;
    publish_transition(&state, &transition);
    Ok(Json(rfq))
}

#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    pub quote_id: Uuid,
}

/// POST /v1/rfqs/{id}/award
async fn award(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<AwardRequest>,
) -> Result<(StatusCode, Json<chandler_order::models::Order>), ApiError> {
    let order = state.award.award(id, req.quote_id, &actor, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /v1/rfqs/{id}/complete
async fn complete(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let order_completed = state
        .orders
        .find_order_by_rfq(id)
        .await?
        .map(|order| order.status == chandler_order::models::OrderStatus::Completed)
        .unwrap_or(false);
    let transition = rfq.complete(order_completed, &actor, Utc::now())?;
    let rfq = state.rfqs.update_rfq(rfq).await?;
    state.rfqs.append_transition(transition.clone()).await?;
    publish_transition(&state, &transition);
    Ok(Json(rfq))
}

/// POST /v1/rfqs/{id}/cancel
async fn cancel(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<Rfq>, ApiError> {
    let mut rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    let now = Utc::now();
    let transition = rfq.cancel(&req.reason, &actor, now)?;
    let cancelled = rfq.clone();
    let (invitations, quotes) = state.rfqs.cancel_cascade(rfq, transition.clone(), now).await?;
    tracing::info!(
        rfq_id = %id,
        expired_invitations = invitations,
        expired_quotes = quotes,
        "rfq cancelled"
    );
    publish_transition(&state, &transition);
    Ok(Json(cancelled))
}

/// GET /v1/rfqs/{id}/transitions
async fn list_transitions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Transition>>, ApiError> {
    fetch_rfq(&state, id).await?;
    Ok(Json(state.rfqs.list_transitions(id).await?))
}

/// POST /v1/rfqs/{id}/invitations
async fn invite_supplier(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteSupplierRequest>,
) -> Result<(StatusCode, Json<Invitation>), ApiError> {
    let rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;

    let profile = state
        .suppliers
        .get_profile(req.supplier_organization_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(format!("supplier profile {}", req.supplier_organization_id))
        })?;
    if state
        .rfqs
        .get_invitation(id, req.supplier_organization_id)
        .await?
        .is_some()
    {
        return Err(DomainError::conflict("supplier is already invited to this RFQ").into());
    }
    let invitation = Invitation::issue(&rfq, &profile, Utc::now())?;
    let invitation = state.rfqs.save_invitation(invitation).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// GET /v1/rfqs/{id}/invitations
async fn list_invitations(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    let rfq = fetch_rfq(&state, id).await?;
    actor.ensure_buyer()?;
    actor.ensure_owns(rfq.buyer_organization_id)?;
    Ok(Json(state.rfqs.list_invitations(id).await?))
}

/// POST /v1/rfqs/{id}/invitations/respond
async fn respond_to_invitation(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<InvitationResponseRequest>,
) -> Result<Json<Invitation>, ApiError> {
    actor.ensure_supplier()?;
    let mut invitation = state
        .rfqs
        .get_invitation(id, actor.organization_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("invitation for RFQ {id}")))?;
    invitation.respond(req.accept, Utc::now())?;
    Ok(Json(state.rfqs.save_invitation(invitation).await?))
}

/// POST /v1/rfqs/{id}/quotes
///
/// Submit or revise the calling supplier's quote. The submission is a full
/// replacement of the line set.
async fn submit_quote(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitQuoteRequest>,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    actor.ensure_supplier()?;
    let rfq = fetch_rfq(&state, id).await?;
    let profile = state
        .suppliers
        .get_profile(actor.organization_id)
        .await?
        .ok_or_else(|| DomainError::authorization("supplier has no onboarded profile"))?;
    profile.ensure_can_bid()?;

    let invitation_status = state
        .rfqs
        .get_invitation(id, actor.organization_id)
        .await?
        .map(|invitation| invitation.status);

    let existing = state
        .quotes
        .list_quotes_for_rfq(id)
        .await?
        .into_iter()
        .find(|quote| quote.supplier_organization_id == actor.organization_id);
    let is_new = existing.is_none();
    let mut quote = existing
        .unwrap_or_else(|| Quote::new(id, actor.organization_id, rfq.currency.clone()));

    // Revisions may pin the version they were prepared against.
    if !is_new {
        if let Some(expected) = req.version {
            chandler_core::version::ensure_version(expected, quote.version)?;
        }
    }

    if let Some(cap) = profile.capabilities().max_open_quotes {
        if is_new {
            let open = state
                .quotes
                .list_quotes_for_supplier(actor.organization_id)
                .await?
                .iter()
                .filter(|q| !q.status.is_terminal())
                .count();
            if open >= cap as usize {
                return Err(DomainError::conflict(format!(
                    "supplier tier allows at most {cap} open quotes"
                ))
                .into());
            }
        }
    }

    let lines: Vec<QuoteLineInput> = req
        .line_items
        .into_iter()
        .map(|line| QuoteLineInput {
            rfq_line_item_id: line.rfq_line_item_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
        })
        .collect();
    let now = Utc::now();
    ledger::submit(
        &mut quote,
        &rfq,
        invitation_status,
        lines,
        state.business_rules.price_tolerance_decimal(),
        now,
    )?;

    let quote = if is_new {
        state.quotes.create_quote(quote).await?
    } else {
        state.quotes.update_quote(quote).await?
    };

    // Ranks are advisory and recomputed on every change to the quote set.
    let mut rfq_quotes = state.quotes.list_quotes_for_rfq(id).await?;
    chandler_quote::ranking::recompute_ranks(&mut rfq_quotes);
    state.quotes.replace_quotes_for_rfq(id, rfq_quotes).await?;

    state.bus.publish(DomainEvent::QuoteSubmitted(QuoteSubmittedEvent {
        quote_id: quote.id,
        rfq_id: id,
        supplier_organization_id: actor.organization_id,
        total_amount: quote.total_amount,
        version: quote.version,
        occurred_at: now,
    }));

    let status = if is_new { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(quote)))
}

/// GET /v1/rfqs/{id}/quotes
///
/// Sealed-bid visibility: the buyer sees the quote set only after bidding
/// has closed; a supplier only ever sees their own quote.
async fn list_quotes(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let rfq = fetch_rfq(&state, id).await?;
    let quotes = state.quotes.list_quotes_for_rfq(id).await?;

    match actor.role {
        chandler_core::ActorRole::Supplier => Ok(Json(
            quotes
                .into_iter()
                .filter(|quote| quote.supplier_organization_id == actor.organization_id)
                .collect(),
        )),
        _ => {
            actor.ensure_buyer()?;
            actor.ensure_owns(rfq.buyer_organization_id)?;
            if matches!(
                rfq.status,
                RfqStatus::Draft | RfqStatus::Published | RfqStatus::BiddingOpen
            ) {
                return Err(DomainError::authorization(
                    "quotes are sealed until bidding closes",
                )
                .into());
            }
            Ok(Json(quotes))
        }
    }
}
