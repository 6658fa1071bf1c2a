use std::collections::HashMap;
use std::sync::Arc;

use cartledger_core::{AdjustmentId, DomainError, DomainResult, Entity, Money, OfferId, OrderId};

use crate::adjustment::AdjustmentRecord;
use crate::policy::{LedgerPolicy, NegativeTotalPolicy};
use crate::resolver::OfferResolver;
use crate::store::AdjustmentStore;

/// Per-offer line of [`AdjustmentLedger::reasons_summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentSummary {
    pub offer_id: OfferId,
    /// Reason of the first adjustment applied for the offer.
    pub reason: String,
    pub value: Money,
}

/// Ordered adjustments for a single order.
///
/// Insertion order is application order. It drives `reasons_summary` ordering
/// but never the totals.
///
/// ## Ownership
///
/// A ledger belongs to exactly one in-flight pricing pass. All mutation goes
/// through `&mut self`, so the borrow checker rules out concurrent writers
/// and a reader can never observe a half-cleared ledger. Callers that share a
/// ledger across threads must wrap it in their own lock.
///
/// ## Invariants
///
/// - No two records reference the same offer unless the offer is stackable.
/// - Under [`NegativeTotalPolicy::Reject`] the discounts never exceed the
///   order subtotal (when one is set).
/// - A failed `apply` or `remove` leaves the ledger untouched.
pub struct AdjustmentLedger {
    order_id: OrderId,
    resolver: Arc<dyn OfferResolver>,
    policy: LedgerPolicy,
    order_subtotal: Option<Money>,
    records: Vec<AdjustmentRecord>,
}

impl core::fmt::Debug for AdjustmentLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdjustmentLedger")
            .field("order_id", &self.order_id)
            .field("policy", &self.policy)
            .field("order_subtotal", &self.order_subtotal)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl AdjustmentLedger {
    pub fn new(order_id: OrderId, resolver: Arc<dyn OfferResolver>) -> Self {
        Self::with_policy(order_id, resolver, LedgerPolicy::default())
    }

    pub fn with_policy(
        order_id: OrderId,
        resolver: Arc<dyn OfferResolver>,
        policy: LedgerPolicy,
    ) -> Self {
        Self {
            order_id,
            resolver,
            policy,
            order_subtotal: None,
            records: Vec::new(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Records in application order.
    pub fn records(&self) -> &[AdjustmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: AdjustmentId) -> Option<&AdjustmentRecord> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    pub fn order_subtotal(&self) -> Option<Money> {
        self.order_subtotal
    }

    /// Set the pre-discount order total the adjustments are measured against.
    ///
    /// A negative subtotal is refused. Under [`NegativeTotalPolicy::Reject`] a
    /// subtotal below the discounts already applied is refused too, and the
    /// previous subtotal stays in place.
    pub fn set_order_subtotal(&mut self, subtotal: Money) -> DomainResult<()> {
        if subtotal.is_negative() {
            return Err(DomainError::invalid_adjustment(format!(
                "order subtotal {subtotal} is negative"
            )));
        }

        if self.policy.negative_total == NegativeTotalPolicy::Reject {
            let discount = self.total_discount();
            if subtotal < discount {
                tracing::warn!(
                    order_id = %self.order_id,
                    subtotal = %subtotal,
                    discount = %discount,
                    "rejected subtotal below applied discounts"
                );
                return Err(DomainError::invalid_adjustment(format!(
                    "subtotal {subtotal} is below applied discounts of {discount}"
                )));
            }
        }

        self.order_subtotal = Some(subtotal);
        Ok(())
    }

    /// Record the discount of an applied offer.
    ///
    /// Mutual exclusion between offers must already be settled by the caller;
    /// the duplicate check here only catches a non-stackable offer applied
    /// twice.
    pub fn apply(
        &mut self,
        offer_id: OfferId,
        reason: impl Into<String>,
        value: Money,
    ) -> DomainResult<AdjustmentRecord> {
        let record = AdjustmentRecord::new(self.order_id, offer_id, reason, value)?;

        let stackable = self.resolver.is_stackable(offer_id)?;
        if !stackable && self.records.iter().any(|r| r.offer_id() == offer_id) {
            tracing::warn!(
                order_id = %self.order_id,
                offer_id = %offer_id,
                "rejected second adjustment for non-stackable offer"
            );
            return Err(DomainError::duplicate_offer(offer_id));
        }

        if self.resolver.is_totalitarian(offer_id)?
            && self.records.iter().any(|r| r.offer_id() != offer_id)
        {
            tracing::warn!(
                order_id = %self.order_id,
                offer_id = %offer_id,
                "totalitarian offer applied alongside other offers"
            );
        }

        let running = self.total_discount().checked_add(value).ok_or_else(|| {
            DomainError::invalid_adjustment(format!(
                "adjustment of {value} overflows the order's total discount"
            ))
        })?;

        if self.policy.negative_total == NegativeTotalPolicy::Reject {
            if let Some(subtotal) = self.order_subtotal {
                let after = subtotal - running;
                if after.is_negative() {
                    return Err(DomainError::invalid_adjustment(format!(
                        "adjustment of {value} would take order total to {after}"
                    )));
                }
            }
        }

        tracing::debug!(
            order_id = %self.order_id,
            offer_id = %offer_id,
            value = %value,
            "adjustment applied"
        );
        self.records.push(record.clone());
        Ok(record)
    }

    /// Remove a persisted record by identifier.
    pub fn remove(&mut self, id: AdjustmentId) -> DomainResult<AdjustmentRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or_else(|| DomainError::record_not_found(format!("adjustment {id}")))?;

        let removed = self.records.remove(pos);
        tracing::debug!(order_id = %self.order_id, adjustment_id = %id, "adjustment removed");
        Ok(removed)
    }

    /// Sum of every record's value; zero for an empty ledger.
    ///
    /// Recomputed on each call.
    pub fn total_discount(&self) -> Money {
        self.records.iter().map(AdjustmentRecord::value).sum()
    }

    /// Subtotal minus discounts, shaped by the negative-total policy.
    ///
    /// `None` until a subtotal has been set.
    pub fn adjusted_total(&self) -> Option<Money> {
        let raw = self.order_subtotal? - self.total_discount();
        Some(match self.policy.negative_total {
            NegativeTotalPolicy::Clamp => raw.floor_at_zero(),
            NegativeTotalPolicy::Allow | NegativeTotalPolicy::Reject => raw,
        })
    }

    /// Drop every record ahead of a full re-pricing.
    pub fn clear(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        tracing::info!(order_id = %self.order_id, dropped, "adjustment ledger cleared");
    }

    /// Discounts grouped by offer, in order of each offer's first application.
    pub fn reasons_summary(&self) -> Vec<AdjustmentSummary> {
        let mut positions: HashMap<OfferId, usize> = HashMap::new();
        let mut summary: Vec<AdjustmentSummary> = Vec::new();

        for record in &self.records {
            match positions.get(&record.offer_id()) {
                Some(&pos) => {
                    let line = &mut summary[pos];
                    line.value = line.value + record.value();
                }
                None => {
                    positions.insert(record.offer_id(), summary.len());
                    summary.push(AdjustmentSummary {
                        offer_id: record.offer_id(),
                        reason: record.reason().to_string(),
                        value: record.value(),
                    });
                }
            }
        }

        summary
    }

    /// Save every record that has no identifier yet and keep the identifier
    /// the store assigned. Returns how many records were saved.
    ///
    /// Stops at the first store failure; records saved before it keep their
    /// identifiers.
    pub fn persist(&mut self, store: &dyn AdjustmentStore) -> DomainResult<usize> {
        let mut saved = 0;
        for record in self.records.iter_mut().filter(|r| !r.is_persisted()) {
            let id = store.save(record)?;
            record.assign_id(id);
            saved += 1;
        }
        if saved > 0 {
            tracing::debug!(order_id = %self.order_id, saved, "adjustments persisted");
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{InMemoryOfferResolver, OfferTraits};
    use crate::store::InMemoryAdjustmentStore;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose `fail_on`-th save fails; every other save is delegated.
    struct FailingStore {
        inner: InMemoryAdjustmentStore,
        saves: AtomicUsize,
        fail_on: usize,
    }

    impl FailingStore {
        fn failing_on(fail_on: usize) -> Self {
            Self {
                inner: InMemoryAdjustmentStore::new(),
                saves: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    impl AdjustmentStore for FailingStore {
        fn save(&self, record: &AdjustmentRecord) -> DomainResult<AdjustmentId> {
            let attempt = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt == self.fail_on {
                return Err(DomainError::persistence("adjustment store unavailable"));
            }
            self.inner.save(record)
        }
    }

    fn money(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount)
    }

    fn offer(resolver: &InMemoryOfferResolver, traits: OfferTraits) -> OfferId {
        let id = OfferId::new();
        resolver.register(id, traits).unwrap();
        id
    }

    fn ledger_with(policy: LedgerPolicy) -> (AdjustmentLedger, Arc<InMemoryOfferResolver>) {
        let resolver = Arc::new(InMemoryOfferResolver::new());
        let ledger = AdjustmentLedger::with_policy(OrderId::new(), resolver.clone(), policy);
        (ledger, resolver)
    }

    fn ledger() -> (AdjustmentLedger, Arc<InMemoryOfferResolver>) {
        ledger_with(LedgerPolicy::default())
    }

    #[test]
    fn empty_ledger_totals_zero() {
        let (ledger, _) = ledger();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_discount(), Money::zero());
        assert!(ledger.reasons_summary().is_empty());
    }

    #[test]
    fn apply_appends_unpersisted_record() {
        let (mut ledger, resolver) = ledger();
        let spring = offer(&resolver, OfferTraits::exclusive());

        let record = ledger.apply(spring, "Spring sale", money(dec!(5.00))).unwrap();

        assert_eq!(record.id(), None);
        assert_eq!(record.order_id(), ledger.order_id());
        assert_eq!(record.offer_id(), spring);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_discount(), money(dec!(5.00)));
    }

    #[test]
    fn second_adjustment_for_non_stackable_offer_is_rejected_without_side_effects() {
        let (mut ledger, resolver) = ledger();
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(spring, "Spring sale", money(dec!(5.00))).unwrap();
        let before = ledger.records().to_vec();

        let err = ledger.apply(spring, "Spring sale", money(dec!(5.00))).unwrap_err();

        assert!(matches!(err, DomainError::DuplicateNonStackableOffer(_)));
        assert_eq!(ledger.records(), before.as_slice());
        assert_eq!(ledger.total_discount(), money(dec!(5.00)));
    }

    #[test]
    fn stackable_offer_may_apply_repeatedly() {
        let (mut ledger, resolver) = ledger();
        let coupon = offer(&resolver, OfferTraits::stackable());
        ledger.apply(coupon, "Loyalty coupon", money(dec!(1.00))).unwrap();
        ledger.apply(coupon, "Loyalty coupon", money(dec!(1.00))).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_discount(), money(dec!(2.00)));
    }

    #[test]
    fn unknown_offer_is_not_found() {
        let (mut ledger, _) = ledger();
        let err = ledger.apply(OfferId::new(), "Mystery", money(dec!(1))).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn totalitarian_offer_is_recorded_not_arbitrated() {
        let (mut ledger, resolver) = ledger();
        let regular = offer(&resolver, OfferTraits::exclusive());
        let everything = offer(&resolver, OfferTraits::totalitarian());
        ledger.apply(regular, "Weekend deal", money(dec!(3))).unwrap();
        ledger.apply(everything, "Staff discount", money(dec!(20))).unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn remove_requires_known_identifier() {
        let (mut ledger, resolver) = ledger();
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(spring, "Spring sale", money(dec!(5))).unwrap();

        let err = ledger.remove(AdjustmentId::new()).unwrap_err();
        assert!(matches!(err, DomainError::RecordNotFound(_)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn persist_assigns_identifiers_then_remove_works() {
        let (mut ledger, resolver) = ledger();
        let store = InMemoryAdjustmentStore::new();
        let spring = offer(&resolver, OfferTraits::exclusive());
        let coupon = offer(&resolver, OfferTraits::stackable());
        ledger.apply(spring, "Spring sale", money(dec!(5))).unwrap();
        ledger.apply(coupon, "Coupon", money(dec!(2))).unwrap();

        assert_eq!(ledger.persist(&store).unwrap(), 2);
        assert_eq!(ledger.persist(&store).unwrap(), 0);

        let id = ledger.records()[0].id().unwrap();
        assert_eq!(store.get(id).unwrap(), ledger.records()[0]);
        assert_eq!(store.list_for_order(ledger.order_id()).len(), 2);

        let removed = ledger.remove(id).unwrap();
        assert_eq!(removed.offer_id(), spring);
        assert!(ledger.get(id).is_none());
        assert_eq!(ledger.total_discount(), money(dec!(2)));
    }

    #[test]
    fn reasons_summary_groups_by_offer_in_first_application_order() {
        let (mut ledger, resolver) = ledger();
        let coupon = offer(&resolver, OfferTraits::stackable());
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(coupon, "Coupon", money(dec!(1.50))).unwrap();
        ledger.apply(spring, "Spring sale", money(dec!(4.00))).unwrap();
        ledger.apply(coupon, "Coupon again", money(dec!(1.25))).unwrap();

        let summary = ledger.reasons_summary();

        assert_eq!(
            summary,
            vec![
                AdjustmentSummary {
                    offer_id: coupon,
                    reason: "Coupon".to_string(),
                    value: money(dec!(2.75)),
                },
                AdjustmentSummary {
                    offer_id: spring,
                    reason: "Spring sale".to_string(),
                    value: money(dec!(4.00)),
                },
            ]
        );
    }

    #[test]
    fn adjusted_total_goes_negative_by_default() {
        let (mut ledger, resolver) = ledger();
        ledger.set_order_subtotal(money(dec!(10.00))).unwrap();
        let big = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(big, "Clearance", money(dec!(12.00))).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(money(dec!(-2.00))));
    }

    #[test]
    fn adjusted_total_is_clamped_when_enabled() {
        let (mut ledger, resolver) = ledger_with(LedgerPolicy::new(NegativeTotalPolicy::Clamp));
        ledger.set_order_subtotal(money(dec!(10.00))).unwrap();
        let big = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(big, "Clearance", money(dec!(12.00))).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(money(dec!(0.00))));
        assert_eq!(ledger.total_discount(), money(dec!(12.00)));
    }

    #[test]
    fn reject_policy_refuses_adjustment_below_zero() {
        let (mut ledger, resolver) = ledger_with(LedgerPolicy::new(NegativeTotalPolicy::Reject));
        ledger.set_order_subtotal(money(dec!(10.00))).unwrap();
        let small = offer(&resolver, OfferTraits::exclusive());
        let big = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(small, "Welcome", money(dec!(4.00))).unwrap();

        let err = ledger.apply(big, "Clearance", money(dec!(6.01))).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAdjustment(_)));
        assert_eq!(ledger.len(), 1);

        ledger.apply(big, "Clearance", money(dec!(6.00))).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(Money::zero()));
    }

    #[test]
    fn adjusted_total_requires_subtotal() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.adjusted_total(), None);
    }

    #[test]
    fn reject_policy_refuses_lowering_subtotal_below_discounts() {
        let (mut ledger, resolver) = ledger_with(LedgerPolicy::new(NegativeTotalPolicy::Reject));
        ledger.set_order_subtotal(money(dec!(100))).unwrap();
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(spring, "Spring sale", money(dec!(50))).unwrap();

        let err = ledger.set_order_subtotal(money(dec!(10))).unwrap_err();

        assert!(matches!(err, DomainError::InvalidAdjustment(_)));
        assert_eq!(ledger.order_subtotal(), Some(money(dec!(100))));
        assert_eq!(ledger.adjusted_total(), Some(money(dec!(50))));

        ledger.set_order_subtotal(money(dec!(50))).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(Money::zero()));
    }

    #[test]
    fn reject_policy_refuses_late_subtotal_below_discounts() {
        let (mut ledger, resolver) = ledger_with(LedgerPolicy::new(NegativeTotalPolicy::Reject));
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(spring, "Spring sale", money(dec!(50))).unwrap();

        let err = ledger.set_order_subtotal(money(dec!(10))).unwrap_err();

        assert!(matches!(err, DomainError::InvalidAdjustment(_)));
        assert_eq!(ledger.order_subtotal(), None);
        assert_eq!(ledger.adjusted_total(), None);
    }

    #[test]
    fn allow_policy_accepts_subtotal_below_discounts() {
        let (mut ledger, resolver) = ledger();
        let spring = offer(&resolver, OfferTraits::exclusive());
        ledger.apply(spring, "Spring sale", money(dec!(50))).unwrap();

        ledger.set_order_subtotal(money(dec!(10))).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(money(dec!(-40))));
    }

    #[test]
    fn negative_subtotal_is_refused() {
        let (mut ledger, _) = ledger();
        let err = ledger.set_order_subtotal(money(dec!(-0.01))).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAdjustment(_)));
        assert_eq!(ledger.order_subtotal(), None);
    }

    #[test]
    fn adjustment_overflowing_the_total_is_rejected() {
        let (mut ledger, resolver) = ledger();
        let coupon = offer(&resolver, OfferTraits::stackable());
        ledger.apply(coupon, "Coupon", money(Decimal::MAX)).unwrap();

        let err = ledger.apply(coupon, "Coupon", money(Decimal::MAX)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAdjustment(_)));
        let err = ledger.apply(coupon, "Coupon", money(dec!(1))).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAdjustment(_)));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_discount(), money(Decimal::MAX));
        assert_eq!(ledger.reasons_summary()[0].value, money(Decimal::MAX));

        ledger.set_order_subtotal(Money::zero()).unwrap();
        assert_eq!(ledger.adjusted_total(), Some(money(-Decimal::MAX)));
    }

    #[test]
    fn persist_stops_at_first_store_failure() {
        let (mut ledger, resolver) = ledger();
        let coupon = offer(&resolver, OfferTraits::stackable());
        for _ in 0..3 {
            ledger.apply(coupon, "Coupon", money(dec!(1))).unwrap();
        }
        let store = FailingStore::failing_on(2);

        let err = ledger.persist(&store).unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        assert!(ledger.records()[0].is_persisted());
        assert!(!ledger.records()[1].is_persisted());
        assert!(!ledger.records()[2].is_persisted());
        assert_eq!(store.inner.list_for_order(ledger.order_id()).len(), 1);

        // A retry only saves what is still missing.
        assert_eq!(ledger.persist(&store).unwrap(), 2);
        assert!(ledger.records().iter().all(AdjustmentRecord::is_persisted));
        assert_eq!(store.inner.list_for_order(ledger.order_id()).len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the total is the plain sum of applied values, whatever
        /// the order of application.
        #[test]
        fn total_is_sum_regardless_of_application_order(
            cents in prop::collection::vec(0i64..100_000i64, 0..20)
        ) {
            let (mut forward, resolver) = ledger();
            let mut backward = AdjustmentLedger::new(forward.order_id(), resolver.clone());

            let offers: Vec<(OfferId, Money)> = cents
                .iter()
                .map(|c| (offer(&resolver, OfferTraits::stackable()), Money::from_minor(*c, 2)))
                .collect();

            for (id, value) in &offers {
                forward.apply(*id, "stack", *value).unwrap();
            }
            for (id, value) in offers.iter().rev() {
                backward.apply(*id, "stack", *value).unwrap();
            }

            let expected: Money = offers.iter().map(|(_, v)| *v).sum();
            prop_assert_eq!(forward.total_discount(), expected);
            prop_assert_eq!(backward.total_discount(), expected);
            prop_assert_eq!(forward.total_discount(), forward.total_discount());
        }

        /// Property: clear always brings the total back to zero.
        #[test]
        fn clear_then_total_is_zero(
            cents in prop::collection::vec(0i64..100_000i64, 0..20)
        ) {
            let (mut ledger, resolver) = ledger();
            for c in cents {
                let id = offer(&resolver, OfferTraits::exclusive());
                ledger.apply(id, "one-off", Money::from_minor(c, 2)).unwrap();
            }
            ledger.clear();
            prop_assert!(ledger.is_empty());
            prop_assert_eq!(ledger.total_discount(), Money::zero());
        }

        /// Property: a rejected duplicate never changes the ledger.
        #[test]
        fn rejected_duplicate_leaves_state_unchanged(
            cents in prop::collection::vec(1i64..10_000i64, 1..10),
            dup_index in 0usize..10
        ) {
            let (mut ledger, resolver) = ledger();
            let mut ids = Vec::new();
            for c in &cents {
                let id = offer(&resolver, OfferTraits::exclusive());
                ledger.apply(id, "one-off", Money::from_minor(*c, 2)).unwrap();
                ids.push(id);
            }
            let before = ledger.records().to_vec();
            let total_before = ledger.total_discount();

            let dup = ids[dup_index % ids.len()];
            let result = ledger.apply(dup, "again", Money::from_minor(1, 2));

            prop_assert!(matches!(result, Err(DomainError::DuplicateNonStackableOffer(_))));
            prop_assert_eq!(ledger.records(), before.as_slice());
            prop_assert_eq!(ledger.total_discount(), total_before);
        }
    }
}
