use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartledger_core::{CategoryId, Entity, ProductId};

/// Node of the category tree.
///
/// Names are **not** unique. Two categories called "Sale" under different
/// parents are normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: Option<CategoryId>,
    pub name: String,
    /// `None` for a root category.
    pub parent_id: Option<CategoryId>,
    /// Start of the active window (inclusive). A category without one has
    /// never been activated.
    pub active_start_date: Option<DateTime<Utc>>,
    /// End of the active window (exclusive). `None` means open-ended.
    pub active_end_date: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            parent_id: None,
            active_start_date: None,
            active_end_date: None,
        }
    }

    pub fn with_id(mut self, id: CategoryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn active_between(
        mut self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.active_start_date = Some(start);
        self.active_end_date = end;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `at` falls inside `[active_start_date, active_end_date)`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        let Some(start) = self.active_start_date else {
            return false;
        };
        start <= at && self.active_end_date.is_none_or(|end| at < end)
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Option<CategoryId> {
        self.id
    }
}

/// Catalog product, as far as category lookups need to know it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub default_category_id: Option<CategoryId>,
}
