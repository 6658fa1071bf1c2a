//! Offer resolution collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cartledger_core::{DomainError, DomainResult, OfferId};

/// Answers the two questions the ledger needs about an offer.
///
/// Offer rules live elsewhere; implementations typically read them from the
/// offer catalog.
pub trait OfferResolver: Send + Sync {
    /// Whether several adjustments for this offer may coexist on one order.
    fn is_stackable(&self, offer_id: OfferId) -> DomainResult<bool>;

    /// Whether this offer excludes every other offer on the order.
    fn is_totalitarian(&self, offer_id: OfferId) -> DomainResult<bool>;
}

impl<R> OfferResolver for Arc<R>
where
    R: OfferResolver + ?Sized,
{
    fn is_stackable(&self, offer_id: OfferId) -> DomainResult<bool> {
        (**self).is_stackable(offer_id)
    }

    fn is_totalitarian(&self, offer_id: OfferId) -> DomainResult<bool> {
        (**self).is_totalitarian(offer_id)
    }
}

/// Combinability flags of an offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferTraits {
    pub stackable: bool,
    pub totalitarian: bool,
}

impl OfferTraits {
    pub fn stackable() -> Self {
        Self {
            stackable: true,
            totalitarian: false,
        }
    }

    pub fn exclusive() -> Self {
        Self::default()
    }

    pub fn totalitarian() -> Self {
        Self {
            stackable: false,
            totalitarian: true,
        }
    }
}

/// In-memory resolver for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOfferResolver {
    inner: RwLock<HashMap<OfferId, OfferTraits>>,
}

impl InMemoryOfferResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, offer_id: OfferId, traits: OfferTraits) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("offer registry lock poisoned"))?;
        map.insert(offer_id, traits);
        Ok(())
    }

    fn traits(&self, offer_id: OfferId) -> DomainResult<OfferTraits> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::persistence("offer registry lock poisoned"))?;
        map.get(&offer_id)
            .copied()
            .ok_or_else(|| DomainError::not_found(format!("offer {offer_id}")))
    }
}

impl OfferResolver for InMemoryOfferResolver {
    fn is_stackable(&self, offer_id: OfferId) -> DomainResult<bool> {
        Ok(self.traits(offer_id)?.stackable)
    }

    fn is_totalitarian(&self, offer_id: OfferId) -> DomainResult<bool> {
        Ok(self.traits(offer_id)?.totalitarian)
    }
}
