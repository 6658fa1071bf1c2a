//! Ledger policy configuration.

use serde::{Deserialize, Serialize};

/// Environment variable selecting [`NegativeTotalPolicy`].
pub const NEGATIVE_TOTAL_ENV: &str = "CARTLEDGER_NEGATIVE_TOTAL";

/// What the ledger does when discounts exceed the order subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeTotalPolicy {
    /// Report the negative adjusted total as is.
    #[default]
    Allow,
    /// Report the adjusted total floored at zero.
    Clamp,
    /// Refuse an adjustment that would take the total below zero.
    Reject,
}

impl core::str::FromStr for NegativeTotalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown negative total policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    #[serde(default)]
    pub negative_total: NegativeTotalPolicy,
}

impl LedgerPolicy {
    pub fn new(negative_total: NegativeTotalPolicy) -> Self {
        Self { negative_total }
    }

    /// Read the policy from the environment, falling back to the default.
    pub fn from_env() -> Self {
        let negative_total = match std::env::var(NEGATIVE_TOTAL_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "{NEGATIVE_TOTAL_ENV} invalid; using default");
                NegativeTotalPolicy::default()
            }),
            Err(_) => NegativeTotalPolicy::default(),
        };

        Self { negative_total }
    }
}
