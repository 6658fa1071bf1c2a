//! `cartledger-core` — shared building blocks for the pricing ledgers and the
//! catalog lookup service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{Entity, same_entity};
pub use error::{DomainError, DomainResult};
pub use id::{AdjustmentId, CategoryId, FeeId, FulfillmentGroupId, OfferId, OrderId, ProductId};
pub use money::Money;
pub use value_object::ValueObject;
