use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    Open,
    UnderReview,
    AwaitingResponse,
    Resolved,
    Escalated,
    Closed,
}

impl DisputeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DisputeStatus::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisputeStatus::Open => "OPEN",
            DisputeStatus::UnderReview => "UNDER_REVIEW",
            DisputeStatus::AwaitingResponse => "AWAITING_RESPONSE",
            DisputeStatus::Resolved => "RESOLVED",
            DisputeStatus::Escalated => "ESCALATED",
            DisputeStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeType {
    QuantityMismatch,
    Quality,
    Damage,
    WrongItems,
    Pricing,
    LateDelivery,
    Other,
}

impl fmt::Display for DisputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisputeType::QuantityMismatch => "QUANTITY_MISMATCH",
            DisputeType::Quality => "QUALITY",
            DisputeType::Damage => "DAMAGE",
            DisputeType::WrongItems => "WRONG_ITEMS",
            DisputeType::Pricing => "PRICING",
            DisputeType::LateDelivery => "LATE_DELIVERY",
            DisputeType::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// Append-only commentary on a dispute. Comments never change the dispute
/// status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeComment {
    pub id: Uuid,
    pub dispute_id: Uuid,
    pub author_organization_id: Uuid,
    pub body: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A dispute raised against an order, usually anchored to one delivery leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: Uuid,
    pub order_id: Uuid,
    pub delivery_id: Option<Uuid>,
    pub dispute_type: DisputeType,
    pub status: DisputeStatus,
    pub description: String,
    pub raised_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub comments: Vec<DisputeComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    pub fn open(
        order_id: Uuid,
        delivery_id: Option<Uuid>,
        dispute_type: DisputeType,
        description: String,
        raised_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if description.trim().is_empty() {
            return Err(DomainError::validation(
                "description",
                "a dispute needs a description of what went wrong",
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            delivery_id,
            dispute_type,
            status: DisputeStatus::Open,
            description,
            raised_by,
            assigned_to: None,
            resolution: None,
            resolved_at: None,
            escalation_reason: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// OPEN -> UNDER_REVIEW. A reviewer takes the case.
    pub fn assign(&mut self, reviewer: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != DisputeStatus::Open {
            return Err(DomainError::invalid_transition(
                "dispute",
                self.status,
                DisputeStatus::UnderReview,
            ));
        }
        self.status = DisputeStatus::UnderReview;
        self.assigned_to = Some(reviewer);
        self.updated_at = now;
        Ok(())
    }

    /// UNDER_REVIEW -> AWAITING_RESPONSE. The reviewer needs input from one
    /// of the parties; responses come back as comments.
    pub fn request_response(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != DisputeStatus::UnderReview {
            return Err(DomainError::invalid_transition(
                "dispute",
                self.status,
                DisputeStatus::AwaitingResponse,
            ));
        }
        self.status = DisputeStatus::AwaitingResponse;
        self.updated_at = now;
        Ok(())
    }

    /// UNDER_REVIEW | AWAITING_RESPONSE -> RESOLVED. The resolution text is
    /// the reviewer's decision; closing is a separate step.
    pub fn resolve(&mut self, resolution: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !matches!(
            self.status,
            DisputeStatus::UnderReview | DisputeStatus::AwaitingResponse
        ) {
            return Err(DomainError::invalid_transition(
                "dispute",
                self.status,
                DisputeStatus::Resolved,
            ));
        }
        if resolution.trim().is_empty() {
            return Err(DomainError::validation("resolution", "resolution text is required"));
        }
        self.status = DisputeStatus::Resolved;
        self.resolution = Some(resolution.to_string());
        self.resolved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Any non-terminal, non-escalated status -> ESCALATED. A reason is
    /// required.
    pub fn escalate(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() || self.status == DisputeStatus::Escalated {
            return Err(DomainError::invalid_transition(
                "dispute",
                self.status,
                DisputeStatus::Escalated,
            ));
        }
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "escalation reason is required"));
        }
        self.status = DisputeStatus::Escalated;
        self.escalation_reason = Some(reason.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// RESOLVED | ESCALATED -> CLOSED.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !matches!(self.status, DisputeStatus::Resolved | DisputeStatus::Escalated) {
            return Err(DomainError::invalid_transition(
                "dispute",
                self.status,
                DisputeStatus::Closed,
            ));
        }
        self.status = DisputeStatus::Closed;
        self.updated_at = now;
        Ok(())
    }

    /// Append a comment. Allowed in every status except CLOSED.
    pub fn add_comment(
        &mut self,
        author_organization_id: Uuid,
        body: String,
        attachments: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<&DisputeComment, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::conflict("cannot comment on a closed dispute"));
        }
        if body.trim().is_empty() {
            return Err(DomainError::validation("body", "comment body must not be empty"));
        }
        self.comments.push(DisputeComment {
            id: Uuid::new_v4(),
            dispute_id: self.id,
            author_organization_id,
            body,
            attachments,
            created_at: now,
        });
        self.updated_at = now;
        Ok(self.comments.last().expect("just pushed"))
    }

    /// A dispute blocks settlement credit until it has at least been looked
    /// at; open or resolved disputes both count for short-delivery credits.
    pub fn affects_settlement(&self) -> bool {
        self.status != DisputeStatus::Closed || self.resolution.is_some()
    }
}
