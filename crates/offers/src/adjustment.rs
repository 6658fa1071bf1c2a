use serde::{Deserialize, Serialize};

use cartledger_core::{AdjustmentId, DomainError, DomainResult, Entity, Money, OfferId, OrderId, same_entity};

/// One discount line attributed to one offer on one order.
///
/// Fixed once created. The only later change is the identifier handed out by
/// the persistence collaborator.
///
/// ## Equality
///
/// `PartialEq` is two-tier: if both records are persisted, identifiers are
/// compared; otherwise `(offer, order, reason, value)` are compared. Mixing
/// persisted and unpersisted records makes the relation non-transitive, so
/// this type deliberately has no `Eq` or `Hash`.
///
/// Deserializing goes through [`AdjustmentRecord::new`], so stored records
/// obey the same rules as fresh ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredAdjustment")]
pub struct AdjustmentRecord {
    id: Option<AdjustmentId>,
    /// Lookup-only back-reference; the record does not own the order.
    order_id: OrderId,
    offer_id: OfferId,
    reason: String,
    value: Money,
}

impl AdjustmentRecord {
    /// Build an unpersisted record.
    ///
    /// Fails with `InvalidAdjustment` for a blank reason or a negative value.
    pub fn new(
        order_id: OrderId,
        offer_id: OfferId,
        reason: impl Into<String>,
        value: Money,
    ) -> DomainResult<Self> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(DomainError::invalid_adjustment("reason must not be blank"));
        }
        if value.is_negative() {
            return Err(DomainError::invalid_adjustment(format!(
                "adjustment value must not be negative (got {value})"
            )));
        }

        Ok(Self {
            id: None,
            order_id,
            offer_id,
            reason,
            value,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn offer_id(&self) -> OfferId {
        self.offer_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn value(&self) -> Money {
        self.value
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn assign_id(&mut self, id: AdjustmentId) {
        self.id = Some(id);
    }

    fn same_content(&self, other: &Self) -> bool {
        self.offer_id == other.offer_id
            && self.order_id == other.order_id
            && self.reason == other.reason
            && self.value == other.value
    }
}

/// Wire shape of a record before validation.
#[derive(Deserialize)]
struct StoredAdjustment {
    id: Option<AdjustmentId>,
    order_id: OrderId,
    offer_id: OfferId,
    reason: String,
    value: Money,
}

impl TryFrom<StoredAdjustment> for AdjustmentRecord {
    type Error = DomainError;

    fn try_from(stored: StoredAdjustment) -> DomainResult<Self> {
        let mut record = Self::new(stored.order_id, stored.offer_id, stored.reason, stored.value)?;
        record.id = stored.id;
        Ok(record)
    }
}

impl Entity for AdjustmentRecord {
    type Id = AdjustmentId;

    fn id(&self) -> Option<AdjustmentId> {
        self.id
    }
}

impl PartialEq for AdjustmentRecord {
    fn eq(&self, other: &Self) -> bool {
        same_entity(self, other, Self::same_content)
    }
}
