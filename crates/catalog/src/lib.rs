//! Catalog category lookups.
//!
//! Read-mostly access to the category tree, shared across concurrent pricing
//! and browsing requests. Storage is a collaborator behind
//! [`CatalogRepository`]; this crate only decides what to ask it and how to
//! filter the answer.

pub mod category;
pub mod config;
pub mod current_time;
pub mod factory;
pub mod repository;
pub mod service;

pub use category::{Category, Product};
pub use config::CatalogConfig;
pub use current_time::CurrentTimeCache;
pub use factory::{CategoryFactory, StandardCategoryFactory};
pub use repository::{CatalogRepository, InMemoryCatalog};
pub use service::CategoryLookupService;
