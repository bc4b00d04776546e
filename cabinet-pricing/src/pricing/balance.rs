//! Proactive balance sufficiency checks.

use serde::{Deserialize, Serialize};

use crate::money::Kopeks;

/// Whether a balance covers a price, computed before any submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    /// Whether the balance covers the price.
    pub has_enough_balance: bool,
    /// Amount to top up before the purchase can go through.
    pub missing_amount_kopeks: Kopeks,
}

impl BalanceCheck {
    /// Compares a balance against a price.
    #[must_use]
    pub fn new(balance: Kopeks, price: Kopeks) -> Self {
        let missing = price.saturating_sub(balance);
        Self { has_enough_balance: missing.is_zero(), missing_amount_kopeks: missing }
    }
}
