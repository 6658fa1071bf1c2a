//! Adjustment persistence collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cartledger_core::{AdjustmentId, DomainError, DomainResult, Entity, OrderId};

use crate::adjustment::AdjustmentRecord;

/// Saves adjustment records and hands back the identifier it assigned.
pub trait AdjustmentStore: Send + Sync {
    fn save(&self, record: &AdjustmentRecord) -> DomainResult<AdjustmentId>;
}

impl<S> AdjustmentStore for Arc<S>
where
    S: AdjustmentStore + ?Sized,
{
    fn save(&self, record: &AdjustmentRecord) -> DomainResult<AdjustmentId> {
        (**self).save(record)
    }
}

/// In-memory adjustment store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAdjustmentStore {
    inner: RwLock<HashMap<AdjustmentId, AdjustmentRecord>>,
}

impl InMemoryAdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: AdjustmentId) -> Option<AdjustmentRecord> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }

    pub fn list_for_order(&self, order_id: OrderId) -> Vec<AdjustmentRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.values()
            .filter(|r| r.order_id() == order_id)
            .cloned()
            .collect()
    }
}

impl AdjustmentStore for InMemoryAdjustmentStore {
    fn save(&self, record: &AdjustmentRecord) -> DomainResult<AdjustmentId> {
        let id = record.id().unwrap_or_default();
        let mut stored = record.clone();
        stored.assign_id(id);

        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("adjustment store lock poisoned"))?;
        map.insert(id, stored);
        Ok(id)
    }
}
