use cartledger_core::{DomainError, DomainResult, Entity, FeeId, FulfillmentGroupId, Money};

use crate::fee::{FeeRecord, FeeStore};

/// Fee sums split for downstream tax calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeTotals {
    pub taxable: Money,
    pub non_taxable: Money,
}

impl FeeTotals {
    pub fn total(&self) -> Money {
        self.taxable + self.non_taxable
    }
}

/// Ordered fees of one fulfillment group.
///
/// Same ownership rules as the order adjustment ledger: one pricing pass owns
/// it, mutation needs `&mut self`. Fees never exclude each other, so there is
/// no uniqueness check.
#[derive(Debug, Clone)]
pub struct FeeLedger {
    fulfillment_group_id: FulfillmentGroupId,
    fees: Vec<FeeRecord>,
}

impl FeeLedger {
    pub fn new(fulfillment_group_id: FulfillmentGroupId) -> Self {
        Self {
            fulfillment_group_id,
            fees: Vec::new(),
        }
    }

    pub fn fulfillment_group_id(&self) -> FulfillmentGroupId {
        self.fulfillment_group_id
    }

    pub fn fees(&self) -> &[FeeRecord] {
        &self.fees
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }

    pub fn get(&self, id: FeeId) -> Option<&FeeRecord> {
        self.fees.iter().find(|f| f.id() == Some(id))
    }

    /// Append a fee.
    ///
    /// Fails with `InvalidAdjustment` for a negative amount, or when the
    /// group's fee total would no longer fit in a `Decimal`. Every partial
    /// sum stays below the checked total, so `total_fees` never overflows.
    pub fn add_fee(
        &mut self,
        name: impl Into<String>,
        reporting_code: impl Into<String>,
        amount: Money,
        taxable: bool,
    ) -> DomainResult<FeeRecord> {
        if amount.is_negative() {
            return Err(DomainError::invalid_adjustment(format!(
                "fee amount must not be negative (got {amount})"
            )));
        }
        if self.total_fees().total().checked_add(amount).is_none() {
            return Err(DomainError::invalid_adjustment(format!(
                "fee of {amount} overflows the fulfillment group's fee total"
            )));
        }

        let fee = FeeRecord::new(self.fulfillment_group_id, name, reporting_code, amount, taxable);
        tracing::debug!(
            fulfillment_group_id = %self.fulfillment_group_id,
            name = %fee.name,
            amount = %fee.amount,
            taxable,
            "fee added"
        );
        self.fees.push(fee.clone());
        Ok(fee)
    }

    pub fn remove_fee(&mut self, id: FeeId) -> DomainResult<FeeRecord> {
        let pos = self
            .fees
            .iter()
            .position(|f| f.id() == Some(id))
            .ok_or_else(|| DomainError::record_not_found(format!("fee {id}")))?;

        let removed = self.fees.remove(pos);
        tracing::debug!(fulfillment_group_id = %self.fulfillment_group_id, fee_id = %id, "fee removed");
        Ok(removed)
    }

    pub fn total_fees(&self) -> FeeTotals {
        self.fees.iter().fold(FeeTotals::default(), |mut acc, fee| {
            if fee.taxable {
                acc.taxable = acc.taxable + fee.amount;
            } else {
                acc.non_taxable = acc.non_taxable + fee.amount;
            }
            acc
        })
    }

    pub fn clear(&mut self) {
        let dropped = self.fees.len();
        self.fees.clear();
        tracing::info!(fulfillment_group_id = %self.fulfillment_group_id, dropped, "fee ledger cleared");
    }

    /// Save fees lacking an identifier; returns how many were saved.
    pub fn persist(&mut self, store: &dyn FeeStore) -> DomainResult<usize> {
        let mut saved = 0;
        for fee in self.fees.iter_mut().filter(|f| f.id().is_none()) {
            let id = store.save(fee)?;
            fee.assign_id(id);
            saved += 1;
        }
        Ok(saved)
    }
}
