use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::Delivery;
use crate::dispute::Dispute;
use crate::models::VendorOrder;

/// One settled line: what was ordered, what arrived, what the buyer accepted
/// and therefore pays for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementLine {
    pub order_line_item_id: Uuid,
    pub line_number: u32,
    pub description: String,
    pub quantity_ordered: Decimal,
    pub quantity_delivered: Decimal,
    pub quantity_accepted: Decimal,
    pub unit_price: Decimal,
    /// quantity_accepted * unit_price, rounded to 2 decimal places.
    pub amount: Decimal,
}

/// Memo line for a disputed shortfall. Informational only: the subtotal
/// already bills accepted quantities, so the credit is never subtracted a
/// second time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAdjustment {
    pub order_line_item_id: Uuid,
    pub dispute_id: Uuid,
    pub quantity_short: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementStatement {
    pub vendor_order_id: Uuid,
    pub currency: String,
    pub lines: Vec<SettlementLine>,
    pub subtotal: Decimal,
    pub credit_adjustments: Vec<CreditAdjustment>,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Reconcile one vendor order against its reviewed deliveries. Pure over its
/// inputs: the statement is recomputed on demand, never stored.
///
/// Billing basis is the accepted quantity. Deliveries that were never
/// reviewed (no accepted quantity recorded) contribute nothing. Shortfalls
/// covered by an open or resolved dispute show up as credit memo lines.
pub fn reconcile(
    vendor_order: &VendorOrder,
    currency: &str,
    deliveries: &[Delivery],
    disputes: &[Dispute],
    tax_rate: Decimal,
) -> SettlementStatement {
    let mut lines = Vec::with_capacity(vendor_order.line_items.len());
    let mut credit_adjustments = Vec::new();

    for item in &vendor_order.line_items {
        let mut delivered = Decimal::ZERO;
        let mut accepted = Decimal::ZERO;
        for delivery in deliveries {
            for delivery_item in delivery
                .items
                .iter()
                .filter(|di| di.order_line_item_id == item.id)
            {
                if let Some(qty) = delivery_item.quantity_delivered {
                    delivered += qty;
                }
                if let Some(qty) = delivery_item.quantity_accepted {
                    accepted += qty;

                    let short = delivery_item.quantity_delivered.unwrap_or(Decimal::ZERO) - qty;
                    if short > Decimal::ZERO {
                        if let Some(dispute) = disputes.iter().find(|d| {
                            d.affects_settlement()
                                && (d.delivery_id == Some(delivery.id) || d.delivery_id.is_none())
                        }) {
                            credit_adjustments.push(CreditAdjustment {
                                order_line_item_id: item.id,
                                dispute_id: dispute.id,
                                quantity_short: short,
                                amount: (short * item.unit_price).round_dp(2),
                            });
                        }
                    }
                }
            }
        }
        lines.push(SettlementLine {
            order_line_item_id: item.id,
            line_number: item.line_number,
            description: item.description.clone(),
            quantity_ordered: item.quantity,
            quantity_delivered: delivered,
            quantity_accepted: accepted,
            unit_price: item.unit_price,
            amount: (accepted * item.unit_price).round_dp(2),
        });
    }

    let subtotal: Decimal = lines.iter().map(|line| line.amount).sum();
    let tax = (subtotal * tax_rate).round_dp(2);

    SettlementStatement {
        vendor_order_id: vendor_order.id,
        currency: currency.to_string(),
        lines,
        subtotal,
        credit_adjustments,
        tax_rate,
        tax,
        total: subtotal + tax,
    }
}
