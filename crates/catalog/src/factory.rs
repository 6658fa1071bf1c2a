//! Category construction.
//!
//! The lookup service builds new categories through a factory chosen when the
//! service is wired up, so an application can substitute its own defaults.

use crate::category::Category;

pub trait CategoryFactory: Send + Sync {
    /// Build an unsaved category.
    fn create(&self, name: &str) -> Category;
}

/// Root category with no active window; it stays hidden until catalog
/// management schedules it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCategoryFactory;

impl CategoryFactory for StandardCategoryFactory {
    fn create(&self, name: &str) -> Category {
        Category::new(name)
    }
}
