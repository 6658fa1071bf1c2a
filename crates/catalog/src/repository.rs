//! Catalog persistence collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cartledger_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::category::{Category, Product};

/// Storage behind the category lookup service.
///
/// Implementations own identifier assignment and child display order.
pub trait CatalogRepository: Send + Sync {
    fn find_category(&self, id: CategoryId) -> DomainResult<Option<Category>>;

    /// Every category with exactly this name.
    fn find_categories_by_name(&self, name: &str) -> DomainResult<Vec<Category>>;

    /// Direct children of `parent`, in display order.
    fn find_children(&self, parent: CategoryId) -> DomainResult<Vec<Category>>;

    fn all_categories(&self) -> DomainResult<Vec<Category>>;

    fn all_products(&self) -> DomainResult<Vec<Product>>;

    /// Store `category`, assigning an identifier if it has none, and return
    /// the stored state.
    fn save_category(&self, category: Category) -> DomainResult<Category>;

    /// Returns `false` when nothing was stored under `id`.
    fn delete_category(&self, id: CategoryId) -> DomainResult<bool>;
}

impl<R> CatalogRepository for Arc<R>
where
    R: CatalogRepository + ?Sized,
{
    fn find_category(&self, id: CategoryId) -> DomainResult<Option<Category>> {
        (**self).find_category(id)
    }

    fn find_categories_by_name(&self, name: &str) -> DomainResult<Vec<Category>> {
        (**self).find_categories_by_name(name)
    }

    fn find_children(&self, parent: CategoryId) -> DomainResult<Vec<Category>> {
        (**self).find_children(parent)
    }

    fn all_categories(&self) -> DomainResult<Vec<Category>> {
        (**self).all_categories()
    }

    fn all_products(&self) -> DomainResult<Vec<Product>> {
        (**self).all_products()
    }

    fn save_category(&self, category: Category) -> DomainResult<Category> {
        (**self).save_category(category)
    }

    fn delete_category(&self, id: CategoryId) -> DomainResult<bool> {
        (**self).delete_category(id)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<CategoryId, Category>,
    /// Insertion order; doubles as display order among siblings.
    order: Vec<CategoryId>,
    products: Vec<Product>,
}

impl CatalogState {
    fn in_order<'a>(&'a self) -> impl Iterator<Item = &'a Category> + 'a {
        self.order.iter().filter_map(|id| self.categories.get(id))
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, product: Product) -> DomainResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("catalog lock poisoned"))?;
        state.products.push(product);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> DomainResult<T> {
        let state = self
            .inner
            .read()
            .map_err(|_| DomainError::persistence("catalog lock poisoned"))?;
        Ok(f(&state))
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn find_category(&self, id: CategoryId) -> DomainResult<Option<Category>> {
        self.read(|s| s.categories.get(&id).cloned())
    }

    fn find_categories_by_name(&self, name: &str) -> DomainResult<Vec<Category>> {
        self.read(|s| s.in_order().filter(|c| c.name == name).cloned().collect())
    }

    fn find_children(&self, parent: CategoryId) -> DomainResult<Vec<Category>> {
        self.read(|s| {
            s.in_order()
                .filter(|c| c.parent_id == Some(parent))
                .cloned()
                .collect()
        })
    }

    fn all_categories(&self) -> DomainResult<Vec<Category>> {
        self.read(|s| s.in_order().cloned().collect())
    }

    fn all_products(&self) -> DomainResult<Vec<Product>> {
        self.read(|s| s.products.clone())
    }

    fn save_category(&self, category: Category) -> DomainResult<Category> {
        let id = category.id().unwrap_or_default();
        let stored = category.with_id(id);

        let mut state = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("catalog lock poisoned"))?;
        if state.categories.insert(id, stored.clone()).is_none() {
            state.order.push(id);
        }
        Ok(stored)
    }

    fn delete_category(&self, id: CategoryId) -> DomainResult<bool> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| DomainError::persistence("catalog lock poisoned"))?;
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        state.order.retain(|c| *c != id);
        Ok(true)
    }
}
