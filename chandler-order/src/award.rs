use chandler_core::{Actor, DomainError};
use chandler_quote::repository::QuoteRepository;
use chandler_rfq::repository::RfqRepository;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use chandler_shared::bus::EventBus;
use chandler_shared::models::events::{DomainEvent, RfqAwardedEvent};

use crate::models::{
    generate_reference_number, Order, OrderLineItem, OrderStatus, VendorOrder, VendorOrderStatus,
};
use crate::repository::OrderRepository;

/// Per-RFQ award locks. Award is the one operation where two concurrent
/// requests racing past validation would corrupt the ledger (double award,
/// two orders for one RFQ), so each RFQ gets its own mutex and the whole
/// validate-then-persist sequence runs under it.
#[derive(Default)]
pub struct AwardLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AwardLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, rfq_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(rfq_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// Materializes an award into the order graph. All repository writes happen
/// only after every validation has passed, so a failed award leaves no
/// partial state behind.
pub struct AwardService {
    rfqs: Arc<dyn RfqRepository>,
    quotes: Arc<dyn QuoteRepository>,
    orders: Arc<dyn OrderRepository>,
    locks: AwardLocks,
    bus: EventBus,
}

impl AwardService {
    pub fn new(
        rfqs: Arc<dyn RfqRepository>,
        quotes: Arc<dyn QuoteRepository>,
        orders: Arc<dyn OrderRepository>,
        bus: EventBus,
    ) -> Self {
        Self {
            rfqs,
            quotes,
            orders,
            locks: AwardLocks::new(),
            bus,
        }
    }

    /// Award `quote_id` on `rfq_id`: transition the RFQ, settle the quote
    /// set (winner AWARDED, awardable losers REJECTED), and create the order
    /// with one vendor order snapshotting the winning quote's lines.
    pub async fn award(
        &self,
        rfq_id: Uuid,
        quote_id: Uuid,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let lock = self.locks.lock_for(rfq_id).await;
        let _guard = lock.lock().await;

        let mut rfq = self
            .rfqs
            .get_rfq(rfq_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("RFQ {rfq_id}")))?;
        actor.ensure_buyer()?;
        actor.ensure_owns(rfq.buyer_organization_id)?;

        let mut rfq_quotes = self.quotes.list_quotes_for_rfq(rfq_id).await?;
        let winner = rfq_quotes
            .iter()
            .find(|quote| quote.id == quote_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("quote {quote_id} on RFQ {rfq_id}"))
            })?
            .clone();
        if !winner.status.is_awardable() {
            return Err(DomainError::conflict(format!(
                "quote {} is {} and cannot be awarded",
                winner.id, winner.status
            )));
        }

        let transition =
            rfq.mark_awarded(winner.id, winner.supplier_organization_id, actor, now)?;

        let (order, vendor_order) = materialize(&rfq, &winner, now)?;

        for quote in rfq_quotes.iter_mut() {
            if quote.id == winner.id {
                quote.mark_awarded(now)?;
            } else {
                quote.mark_rejected(now);
            }
        }

        // Validation is done; everything below is persistence.
        self.rfqs.update_rfq(rfq.clone()).await?;
        self.rfqs.append_transition(transition).await?;
        self.quotes.replace_quotes_for_rfq(rfq_id, rfq_quotes).await?;
        let order = self
            .orders
            .create_order_graph(order, vec![vendor_order])
            .await?;

        tracing::info!(
            rfq_id = %rfq_id,
            quote_id = %winner.id,
            order_id = %order.id,
            supplier = %winner.supplier_organization_id,
            "rfq awarded"
        );
        self.bus.publish(DomainEvent::RfqAwarded(RfqAwardedEvent {
            rfq_id,
            quote_id: winner.id,
            supplier_organization_id: winner.supplier_organization_id,
            order_id: order.id,
            total_amount: winner.total_amount,
            occurred_at: now,
        }));

        Ok(order)
    }
}

/// Build the order graph from the awarded quote. Order lines are frozen
/// copies joining the quote lines to the RFQ lines they answer.
fn materialize(
    rfq: &chandler_rfq::models::Rfq,
    winner: &chandler_quote::models::Quote,
    now: DateTime<Utc>,
) -> Result<(Order, VendorOrder), DomainError> {
    let order_id = Uuid::new_v4();
    let vendor_order_id = Uuid::new_v4();

    let mut line_items = Vec::with_capacity(winner.line_items.len());
    for quote_line in &winner.line_items {
        let rfq_line = rfq.line_item(quote_line.rfq_line_item_id).ok_or_else(|| {
            DomainError::conflict(format!(
                "quote line {} references unknown RFQ line {}",
                quote_line.id, quote_line.rfq_line_item_id
            ))
        })?;
        line_items.push(OrderLineItem {
            id: Uuid::new_v4(),
            vendor_order_id,
            rfq_line_item_id: rfq_line.id,
            quote_line_item_id: quote_line.id,
            line_number: rfq_line.line_number,
            description: rfq_line.description.clone(),
            quantity: quote_line.quantity,
            unit_of_measure: rfq_line.unit_of_measure.clone(),
            unit_price: quote_line.unit_price,
            total_price: quote_line.total_price,
        });
    }
    line_items.sort_by_key(|item| item.line_number);

    let vendor_order = VendorOrder {
        id: vendor_order_id,
        order_id,
        supplier_organization_id: winner.supplier_organization_id,
        status: VendorOrderStatus::Pending,
        subtotal: winner.total_amount,
        line_items,
        fulfillments: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let order = Order {
        id: order_id,
        reference_number: generate_reference_number(now),
        rfq_id: rfq.id,
        quote_id: winner.id,
        buyer_organization_id: rfq.buyer_organization_id,
        vessel_name: rfq.vessel_name.clone(),
        delivery_port: rfq.delivery_port.clone(),
        delivery_date: rfq.delivery_date,
        currency: winner.currency.clone(),
        total_amount: winner.total_amount,
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    Ok((order, vendor_order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chandler_quote::models::{Quote, QuoteLineItem, QuoteStatus};
    use chandler_rfq::models::{Rfq, RfqLineItem};
    use rust_decimal::Decimal;

    fn rfq_with_two_lines() -> Rfq {
        let mut rfq = Rfq::new(
            Uuid::new_v4(),
            "Deck stores".to_string(),
            "USD".to_string(),
            Some("MV Aurora".to_string()),
            "SGSIN".to_string(),
            None,
            None,
            false,
            true,
            true,
        )
        .unwrap();
        for (n, (desc, qty, unit)) in [("Fresh water", 10, "t"), ("Mooring rope", 5, "m")]
            .into_iter()
            .enumerate()
        {
            let item = RfqLineItem::new(
                rfq.id,
                n as u32 + 1,
                desc.to_string(),
                Decimal::from(qty),
                unit.to_string(),
                None,
            )
            .unwrap();
            rfq.line_items.push(item);
        }
        rfq
    }

    fn quote_answering(rfq: &Rfq) -> Quote {
        let mut quote = Quote::new(rfq.id, Uuid::new_v4(), "USD".to_string());
        quote.status = QuoteStatus::Submitted;
        quote.submitted_at = Some(Utc::now());
        for line in &rfq.line_items {
            let unit_price = Decimal::new(500, 2);
            quote.line_items.push(QuoteLineItem {
                id: Uuid::new_v4(),
                quote_id: quote.id,
                rfq_line_item_id: line.id,
                quantity: line.quantity,
                unit_price,
                total_price: line.quantity * unit_price,
            });
        }
        quote.total_amount = quote.line_items.iter().map(|l| l.total_price).sum();
        quote
    }

    #[test]
    fn test_materialize_snapshots_quote_lines() {
        let rfq = rfq_with_two_lines();
        let quote = quote_answering(&rfq);
        let (order, vendor_order) = materialize(&rfq, &quote, Utc::now()).unwrap();

        assert_eq!(order.total_amount, quote.total_amount);
        assert_eq!(order.rfq_id, rfq.id);
        assert_eq!(order.quote_id, quote.id);
        assert!(order.reference_number.starts_with("PO-"));
        assert_eq!(vendor_order.order_id, order.id);
        assert_eq!(vendor_order.line_items.len(), 2);
        assert_eq!(vendor_order.line_items[0].line_number, 1);
        assert_eq!(vendor_order.line_items[0].description, "Fresh water");
        assert_eq!(vendor_order.line_items[0].quantity, Decimal::from(10));
        assert_eq!(vendor_order.line_items[0].total_price, Decimal::new(5000, 2));
    }

    #[test]
    fn test_materialize_rejects_dangling_quote_line() {
        let rfq = rfq_with_two_lines();
        let mut quote = quote_answering(&rfq);
        quote.line_items[0].rfq_line_item_id = Uuid::new_v4();
        assert!(matches!(
            materialize(&rfq, &quote, Utc::now()).unwrap_err(),
            DomainError::Conflict(_)
        ));
    }
}
