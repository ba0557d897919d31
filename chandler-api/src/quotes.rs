use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use chandler_core::{ActorRole, DomainError, Page, PageParams};
use chandler_quote::models::Quote;
use chandler_rfq::models::RfqStatus;
use chandler_shared::models::events::{DomainEvent, QuoteWithdrawnEvent};

use crate::error::ApiError;
use crate::extract::Identity;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/quotes", get(list_my_quotes))
        .route("/v1/quotes/{id}", get(get_quote))
        .route("/v1/quotes/{id}/withdraw", post(withdraw_quote))
}

#[derive(Debug, Deserialize)]
pub struct ListQuotesQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /v1/quotes
///
/// The calling supplier's own quotes across RFQs.
async fn list_my_quotes(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Query(query): Query<ListQuotesQuery>,
) -> Result<Json<Page<Quote>>, ApiError> {
    actor.ensure_supplier()?;
    let quotes = state.quotes.list_quotes_for_supplier(actor.organization_id).await?;
    Ok(Json(Page::slice(
        quotes,
        PageParams {
            limit: query.limit,
            offset: query.offset,
        },
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    )))
}

/// GET /v1/quotes/{id}
///
/// Visible to the owning supplier always; to the RFQ's buyer only after
/// bidding has closed.
async fn get_quote(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, ApiError> {
    let quote = state
        .quotes
        .get_quote(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("quote {id}")))?;

    match actor.role {
        ActorRole::Supplier => {
            actor.ensure_owns(quote.supplier_organization_id)?;
        }
        _ => {
            let rfq = state
                .rfqs
                .get_rfq(quote.rfq_id)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("RFQ {}", quote.rfq_id)))?;
            actor.ensure_buyer()?;
            actor.ensure_owns(rfq.buyer_organization_id)?;
            if matches!(
                rfq.status,
                RfqStatus::Draft | RfqStatus::Published | RfqStatus::BiddingOpen
            ) {
                return Err(
                    DomainError::authorization("quotes are sealed until bidding closes").into(),
                );
            }
        }
    }
    Ok(Json(quote))
}

/// POST /v1/quotes/{id}/withdraw
async fn withdraw_quote(
    State(state): State<AppState>,
    Identity(actor): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, ApiError> {
    actor.ensure_supplier()?;
    let mut quote = state
        .quotes
        .get_quote(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("quote {id}")))?;
    actor.ensure_owns(quote.supplier_organization_id)?;

    let now = Utc::now();
    quote.withdraw(now)?;
    let quote = state.quotes.update_quote(quote).await?;

    // Withdrawal reshuffles the advisory ranks for the rest of the set.
    let mut rfq_quotes = state.quotes.list_quotes_for_rfq(quote.rfq_id).await?;
    chandler_quote::ranking::recompute_ranks(&mut rfq_quotes);
    state.quotes.replace_quotes_for_rfq(quote.rfq_id, rfq_quotes).await?;

    state.bus.publish(DomainEvent::QuoteWithdrawn(QuoteWithdrawnEvent {
        quote_id: quote.id,
        rfq_id: quote.rfq_id,
        supplier_organization_id: quote.supplier_organization_id,
        occurred_at: now,
    }));
    Ok(Json(quote))
}
