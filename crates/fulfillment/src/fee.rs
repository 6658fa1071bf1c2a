use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use cartledger_core::{DomainError, DomainResult, Entity, FeeId, FulfillmentGroupId, Money};

/// Monetary line item charged on a fulfillment group (handling, packaging...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecord {
    id: Option<FeeId>,
    /// Lookup-only back-reference.
    fulfillment_group_id: FulfillmentGroupId,
    pub amount: Money,
    pub name: String,
    pub reporting_code: String,
    pub taxable: bool,
}

impl FeeRecord {
    pub fn new(
        fulfillment_group_id: FulfillmentGroupId,
        name: impl Into<String>,
        reporting_code: impl Into<String>,
        amount: Money,
        taxable: bool,
    ) -> Self {
        Self {
            id: None,
            fulfillment_group_id,
            amount,
            name: name.into(),
            reporting_code: reporting_code.into(),
            taxable,
        }
    }

    pub fn fulfillment_group_id(&self) -> FulfillmentGroupId {
        self.fulfillment_group_id
    }

    pub(crate) fn assign_id(&mut self, id: FeeId) {
        self.id = Some(id);
    }
}

impl Entity for FeeRecord {
    type Id = FeeId;

    fn id(&self) -> Option<FeeId> {
        self.id
    }
}

/// Saves fee records and hands back the identifier it assigned.
pub trait FeeStore: Send + Sync {
    fn save(&self, fee: &FeeRecord) -> DomainResult<FeeId>;
}

impl<S> FeeStore for Arc<S>
where
    S: FeeStore + ?Sized,
{
    fn save(&self, fee: &FeeRecord) -> DomainResult<FeeId> {
        (**self).save(fee)
    }
}

/// In-memory fee store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryFeeStore {
    inner: RwLock<HashMap<FeeId, FeeRecord>>,
}

impl InMemoryFeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FeeId) -> Option<FeeRecord> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }
}

impl FeeStore for InMemoryFeeStore {
    fn save(&self, fee: &FeeRecord) -> DomainResult<FeeId> {
        let id = fee.id().unwrap_or_default();
        let mut stored = fee.clone();
        stored.assign_id(id);

        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("fee store lock poisoned"))?;
        map.insert(id, stored);
        Ok(id)
    }
}
