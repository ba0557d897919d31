use chandler_core::DomainError;
use chandler_rfq::{InvitationStatus, Rfq, RfqStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Quote, QuoteLineItem, QuoteStatus};

/// Incoming priced line, before it is attached to a quote.
#[derive(Debug, Clone)]
pub struct QuoteLineInput {
    pub rfq_line_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Validate line arithmetic (`total_price = unit_price × quantity` within the
/// currency rounding tolerance) and cross-check every line against the RFQ's
/// line items. Violations name the offending field; nothing is clamped.
pub fn validate_lines(
    rfq: &Rfq,
    lines: &[QuoteLineInput],
    tolerance: Decimal,
) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::validation("line_items", "a quote needs at least one line"));
    }
    let mut seen: Vec<Uuid> = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let field = |name: &str| format!("line_items[{index}].{name}");
        if rfq.line_item(line.rfq_line_item_id).is_none() {
            return Err(DomainError::validation(
                field("rfq_line_item_id"),
                "line does not reference an RFQ line item",
            ));
        }
        if seen.contains(&line.rfq_line_item_id) {
            return Err(DomainError::validation(
                field("rfq_line_item_id"),
                "duplicate line for the same RFQ line item",
            ));
        }
        seen.push(line.rfq_line_item_id);
        if line.quantity <= Decimal::ZERO {
            return Err(DomainError::validation(field("quantity"), "quantity must be positive"));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(DomainError::validation(
                field("unit_price"),
                "unit price must not be negative",
            ));
        }
        let expected = line.unit_price * line.quantity;
        if (expected - line.total_price).abs() > tolerance {
            return Err(DomainError::validation(
                field("total_price"),
                format!("total_price must equal unit_price × quantity (expected {expected})"),
            ));
        }
    }
    Ok(())
}

/// `is_complete` is computed, never taken from the client: true iff every
/// RFQ line item is covered, or the RFQ allows partial quotes.
pub fn compute_completeness(rfq: &Rfq, lines: &[QuoteLineInput]) -> bool {
    if rfq.allow_partial_quotes {
        return true;
    }
    rfq.line_items
        .iter()
        .all(|item| lines.iter().any(|line| line.rfq_line_item_id == item.id))
}

fn covers_all(rfq: &Rfq, lines: &[QuoteLineInput]) -> bool {
    rfq.line_items
        .iter()
        .all(|item| lines.iter().any(|line| line.rfq_line_item_id == item.id))
}

pub fn compute_total(lines: &[QuoteLineInput]) -> Decimal {
    lines.iter().map(|line| line.total_price).sum()
}

/// Submit (or revise) a quote with a full replacement line set.
///
/// Guards, in order: the submission window is open, the supplier holds an
/// accepted invitation, coverage satisfies `require_all_line_items`, the
/// quote is in a submittable state under the RFQ's revision policy, and the
/// arithmetic checks out. On success the version is bumped and the line set
/// replaced.
#[allow(clippy::too_many_arguments)]
pub fn submit(
    quote: &mut Quote,
    rfq: &Rfq,
    invitation_status: Option<InvitationStatus>,
    lines: Vec<QuoteLineInput>,
    tolerance: Decimal,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if rfq.status != RfqStatus::BiddingOpen {
        return Err(DomainError::conflict(format!(
            "quotes can only be submitted while bidding is open (RFQ status {})",
            rfq.status
        )));
    }
    if let Some(deadline) = rfq.bidding_deadline {
        if now > deadline {
            return Err(DomainError::validation(
                "bidding_deadline",
                format!("bidding closed at {deadline}"),
            ));
        }
    }
    if invitation_status != Some(InvitationStatus::Accepted) {
        return Err(DomainError::authorization(
            "supplier does not hold an accepted invitation for this RFQ",
        ));
    }
    if rfq.require_all_line_items && !covers_all(rfq, &lines) {
        return Err(DomainError::validation(
            "line_items",
            "this RFQ requires a quote for every line item",
        ));
    }
    validate_lines(rfq, &lines, tolerance)?;

    let next_status = match quote.status {
        QuoteStatus::Draft => QuoteStatus::Submitted,
        QuoteStatus::Submitted | QuoteStatus::Revised => {
            if !rfq.allow_quote_revision {
                return Err(DomainError::conflict(
                    "this RFQ does not allow quote revision; withdraw and submit a new quote",
                ));
            }
            QuoteStatus::Revised
        }
        other => {
            return Err(DomainError::invalid_transition("quote", other, QuoteStatus::Submitted))
        }
    };

    quote.is_complete = compute_completeness(rfq, &lines);
    quote.total_amount = compute_total(&lines);
    quote.line_items = lines
        .into_iter()
        .map(|line| QuoteLineItem {
            id: Uuid::new_v4(),
            quote_id: quote.id,
            rfq_line_item_id: line.rfq_line_item_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
        })
        .collect();
    quote.status = next_status;
    quote.version += 1;
    if quote.submitted_at.is_none() {
        quote.submitted_at = Some(now);
    }
    quote.updated_at = now;
    Ok(())
}
