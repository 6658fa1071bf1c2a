//! Order adjustment ledger.
//!
//! Records the discounts that applied offers contribute to one order and
//! answers aggregate questions about them. Pure bookkeeping: offer rules,
//! persistence and ordering between competing offers are collaborators'
//! concerns.

pub mod adjustment;
pub mod ledger;
pub mod policy;
pub mod resolver;
pub mod store;

pub use adjustment::AdjustmentRecord;
pub use ledger::{AdjustmentLedger, AdjustmentSummary};
pub use policy::{LedgerPolicy, NegativeTotalPolicy};
pub use resolver::{InMemoryOfferResolver, OfferResolver, OfferTraits};
pub use store::{AdjustmentStore, InMemoryAdjustmentStore};
