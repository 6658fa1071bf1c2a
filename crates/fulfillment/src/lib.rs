//! Fulfillment group fees.
//!
//! Pure domain logic only: fee calculation and persistence are collaborators.

pub mod fee;
pub mod ledger;

pub use fee::{FeeRecord, FeeStore, InMemoryFeeStore};
pub use ledger::{FeeLedger, FeeTotals};
