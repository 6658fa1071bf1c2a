//! Process-wide tracing setup for applications embedding the ledgers.
//!
//! Library crates in this workspace only emit `tracing` events; installing a
//! subscriber is left to the host process, which calls [`init`] once at
//! startup.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};
