use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use cartledger_core::{CategoryId, Clock, DomainError, DomainResult, Entity};

use crate::category::{Category, Product};
use crate::config::CatalogConfig;
use crate::current_time::{CurrentTimeCache, duration_ms};
use crate::factory::{CategoryFactory, StandardCategoryFactory};
use crate::repository::CatalogRepository;

/// Hierarchical category lookups shared across concurrent callers.
///
/// Everything here is `&self`; the only state the service mutates itself is
/// the cached current time, which is lock-free (see [`CurrentTimeCache`]).
pub struct CategoryLookupService {
    repository: Arc<dyn CatalogRepository>,
    clock: Arc<dyn Clock>,
    factory: Arc<dyn CategoryFactory>,
    current_time: CurrentTimeCache,
}

impl core::fmt::Debug for CategoryLookupService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CategoryLookupService")
            .field("current_time", &self.current_time)
            .finish_non_exhaustive()
    }
}

impl CategoryLookupService {
    pub fn new(repository: Arc<dyn CatalogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(repository, clock, CatalogConfig::default())
    }

    pub fn with_config(
        repository: Arc<dyn CatalogRepository>,
        clock: Arc<dyn Clock>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            factory: Arc::new(StandardCategoryFactory),
            current_time: CurrentTimeCache::new(Duration::from_millis(
                config.current_date_resolution_ms,
            )),
        }
    }

    /// Replace the factory used by [`create`](Self::create).
    pub fn with_factory(mut self, factory: Arc<dyn CategoryFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn by_id(&self, id: CategoryId) -> DomainResult<Category> {
        self.repository
            .find_category(id)?
            .ok_or_else(|| DomainError::not_found(format!("category {id}")))
    }

    /// All categories with this name; empty when there are none.
    pub fn by_name(&self, name: &str) -> DomainResult<Vec<Category>> {
        self.repository.find_categories_by_name(name)
    }

    /// Single-result name lookup kept for older callers.
    ///
    /// Fails with `NotFound` for no match and `AmbiguousResult` for more than
    /// one, instead of picking one silently.
    #[deprecated(note = "category names are not unique; use `by_name`")]
    pub fn by_name_single(&self, name: &str) -> DomainResult<Category> {
        let mut matches = self.by_name(name)?;
        match matches.len() {
            0 => Err(DomainError::not_found(format!("category named {name:?}"))),
            1 => Ok(matches.remove(0)),
            n => {
                tracing::warn!(name, matches = n, "ambiguous single category lookup");
                Err(DomainError::ambiguous(format!(
                    "{n} categories named {name:?}"
                )))
            }
        }
    }

    /// Direct children in display order, whatever their active window.
    pub fn children(&self, parent: CategoryId) -> DomainResult<Vec<Category>> {
        self.repository.find_children(parent)
    }

    /// Direct children whose active window contains `as_of`.
    pub fn active_children(
        &self,
        parent: CategoryId,
        as_of: DateTime<Utc>,
    ) -> DomainResult<Vec<Category>> {
        let mut children = self.children(parent)?;
        children.retain(|c| c.is_active_at(as_of));
        Ok(children)
    }

    /// [`active_children`](Self::active_children) as of the cached current time.
    pub fn current_active_children(&self, parent: CategoryId) -> DomainResult<Vec<Category>> {
        self.active_children(parent, self.current_time())
    }

    /// Current time, reused for up to the configured resolution.
    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time.now(&*self.clock)
    }

    pub fn current_date_resolution(&self) -> Duration {
        self.current_time.resolution()
    }

    /// Takes effect from the next read; an already cached value is kept.
    pub fn set_current_date_resolution(&self, resolution: Duration) {
        tracing::info!(
            resolution_ms = duration_ms(resolution),
            "current date resolution changed"
        );
        self.current_time.set_resolution(resolution);
    }

    /// Every category. Full scan: meant for admin and batch jobs, not request paths.
    pub fn all_categories(&self) -> DomainResult<Vec<Category>> {
        self.repository.all_categories()
    }

    /// Every product regardless of category. Full scan, like `all_categories`.
    pub fn all_products(&self) -> DomainResult<Vec<Product>> {
        self.repository.all_products()
    }

    /// Persist `category`; the returned value carries the assigned identifier.
    pub fn save(&self, category: Category) -> DomainResult<Category> {
        self.repository.save_category(category)
    }

    pub fn delete(&self, category: &Category) -> DomainResult<()> {
        let id = category
            .id()
            .ok_or_else(|| DomainError::not_found("cannot delete unsaved category"))?;
        if !self.repository.delete_category(id)? {
            return Err(DomainError::not_found(format!("category {id}")));
        }
        tracing::debug!(category_id = %id, "category deleted");
        Ok(())
    }

    /// New unsaved category built by the configured factory.
    pub fn create(&self, name: &str) -> Category {
        self.factory.create(name)
    }
}
