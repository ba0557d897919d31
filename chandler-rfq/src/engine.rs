use chandler_core::{Actor, DomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{Rfq, RfqStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionType {
    Publish,
    OpenBidding,
    CloseBidding,
    StartEvaluation,
    Award,
    Complete,
    Cancel,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionType::Publish => "PUBLISH",
            TransitionType::OpenBidding => "OPEN_BIDDING",
            TransitionType::CloseBidding => "CLOSE_BIDDING",
            TransitionType::StartEvaluation => "START_EVALUATION",
            TransitionType::Award => "AWARD",
            TransitionType::Complete => "COMPLETE",
            TransitionType::Cancel => "CANCEL",
        };
        f.write_str(s)
    }
}

/// Immutable audit record appended for every successful RFQ transition.
/// Never mutated or deleted; replaying the log reconstructs `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub from_status: RfqStatus,
    pub to_status: RfqStatus,
    pub transition_type: TransitionType,
    pub triggered_by: Uuid,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Transition {
    fn record(
        rfq: &Rfq,
        from: RfqStatus,
        transition_type: TransitionType,
        actor: &Actor,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rfq_id: rfq.id,
            from_status: from,
            to_status: rfq.status,
            transition_type,
            triggered_by: actor.organization_id,
            reason,
            occurred_at,
        }
    }
}

/// Deterministically reconstruct the current status from the transition log,
/// starting at DRAFT. Returns an error if the log is not contiguous.
pub fn replay_status(transitions: &[Transition]) -> Result<RfqStatus, DomainError> {
    let mut status = RfqStatus::Draft;
    for transition in transitions {
        if transition.from_status != status {
            return Err(DomainError::conflict(format!(
                "transition log is not contiguous: expected from {}, found {}",
                status, transition.from_status
            )));
        }
        status = transition.to_status;
    }
    Ok(status)
}

impl Rfq {
    fn guard(&self, expected: RfqStatus, target: RfqStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invalid_transition("rfq", self.status, target));
        }
        Ok(())
    }

    /// DRAFT -> PUBLISHED. Requires at least one line item.
    pub fn publish(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::Draft, RfqStatus::Published)?;
        if self.line_items.is_empty() {
            return Err(DomainError::validation(
                "line_items",
                "an RFQ needs at least one line item before publishing",
            ));
        }
        let from = self.status;
        self.status = RfqStatus::Published;
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::Publish, actor, None, now))
    }

    /// PUBLISHED -> BIDDING_OPEN. The deadline must be set and in the future.
    pub fn open_bidding(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::Published, RfqStatus::BiddingOpen)?;
        match self.bidding_deadline {
            None => {
                return Err(DomainError::validation(
                    "bidding_deadline",
                    "bidding deadline must be set before opening bidding",
                ))
            }
            Some(deadline) if deadline <= now => {
                return Err(DomainError::validation(
                    "bidding_deadline",
                    "bidding deadline must be in the future",
                ))
            }
            Some(_) => {}
        }
        let from = self.status;
        self.status = RfqStatus::BiddingOpen;
        self.bidding_start = Some(now);
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::OpenBidding, actor, None, now))
    }

    /// BIDDING_OPEN -> BIDDING_CLOSED. Either the deadline has passed or the
    /// caller (buyer or external scheduler) closes manually; both arrive
    /// through the same operation, so only the status is guarded here.
    pub fn close_bidding(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::BiddingOpen, RfqStatus::BiddingClosed)?;
        let from = self.status;
        self.status = RfqStatus::BiddingClosed;
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::CloseBidding, actor, None, now))
    }

    /// BIDDING_CLOSED -> EVALUATION. Requires at least one submitted quote.
    pub fn start_evaluation(
        &mut self,
        submitted_quotes: usize,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::BiddingClosed, RfqStatus::Evaluation)?;
        if submitted_quotes == 0 {
            return Err(DomainError::conflict(
                "cannot start evaluation without at least one submitted quote",
            ));
        }
        let from = self.status;
        self.status = RfqStatus::Evaluation;
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::StartEvaluation, actor, None, now))
    }

    /// EVALUATION -> AWARDED. Called by the award materializer under its
    /// per-RFQ lock; quote eligibility is validated by the caller.
    pub fn mark_awarded(
        &mut self,
        quote_id: Uuid,
        supplier_organization_id: Uuid,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::Evaluation, RfqStatus::Awarded)?;
        let from = self.status;
        self.status = RfqStatus::Awarded;
        self.awarded_quote_id = Some(quote_id);
        self.awarded_supplier_id = Some(supplier_organization_id);
        self.awarded_at = Some(now);
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::Award, actor, None, now))
    }

    /// AWARDED -> COMPLETED. Requires the materialized order to be completed.
    pub fn complete(
        &mut self,
        order_completed: bool,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        self.guard(RfqStatus::Awarded, RfqStatus::Completed)?;
        if !order_completed {
            return Err(DomainError::conflict(
                "the materialized order must be completed before the RFQ can complete",
            ));
        }
        let from = self.status;
        self.status = RfqStatus::Completed;
        self.updated_at = now;
        Ok(Transition::record(self, from, TransitionType::Complete, actor, None, now))
    }

    /// Any non-terminal status -> CANCELLED. A reason is required. The store
    /// cascades invitation/quote expiry in the same mutation.
    pub fn cancel(
        &mut self,
        reason: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Transition, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition("rfq", self.status, RfqStatus::Cancelled));
        }
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "cancellation reason is required"));
        }
        let from = self.status;
        self.status = RfqStatus::Cancelled;
        self.cancelled_reason = Some(reason.to_string());
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(Transition::record(
            self,
            from,
            TransitionType::Cancel,
            actor,
            Some(reason.to_string()),
            now,
        ))
    }
}
