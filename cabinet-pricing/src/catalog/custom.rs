//! Custom period length and custom traffic amounts.
//!
//! Out-of-bounds input is clamped at this boundary and never reaches a
//! calculator as an error.

use serde::{Deserialize, Serialize};

use super::models::Tariff;
use crate::money::Kopeks;

/// Custom period length support of a tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomDaysOption {
    /// Whether custom lengths can be bought.
    pub enabled: bool,
    /// Shortest purchasable length.
    pub min_days: u32,
    /// Longest purchasable length.
    pub max_days: u32,
}

impl Default for CustomDaysOption {
    fn default() -> Self {
        Self { enabled: false, min_days: 1, max_days: 365 }
    }
}

impl CustomDaysOption {
    /// Clamps a requested length into `[min_days, max_days]`.
    #[must_use]
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.clamp(self.min_days, self.max_days.max(self.min_days))
    }
}

/// Custom traffic amount support of a tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomTrafficOption {
    /// Whether custom traffic amounts can be bought.
    pub enabled: bool,
    /// Smallest purchasable amount in GB.
    pub min_gb: u64,
    /// Largest purchasable amount in GB.
    pub max_gb: u64,
    /// Price per GB.
    pub price_per_gb_kopeks: Kopeks,
}

impl Default for CustomTrafficOption {
    fn default() -> Self {
        Self { enabled: false, min_gb: 1, max_gb: 10_000, price_per_gb_kopeks: Kopeks::ZERO }
    }
}

impl CustomTrafficOption {
    /// Clamps a requested amount into `[min_gb, max_gb]`.
    #[must_use]
    pub fn clamp(&self, requested: u64) -> u64 {
        requested.clamp(self.min_gb, self.max_gb.max(self.min_gb))
    }
}

/// A priced custom-length period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomPeriodQuote {
    /// Length after clamping.
    pub days: u32,
    /// Price for the whole length.
    pub price: Kopeks,
}

/// Prices a custom period length at the tariff's daily rate.
///
/// Returns `None` when the tariff does not offer custom lengths or has no
/// daily price.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::catalog::{Tariff, custom_period_price};
///
/// let tariff: Tariff = serde_json::from_str(r#"{
///     "id": 3, "name": "Flex", "daily_price_kopeks": 1000,
///     "custom_days": { "enabled": true, "min_days": 7, "max_days": 60 }
/// }"#).unwrap();
///
/// let quote = custom_period_price(&tariff, 3).unwrap();
/// assert_eq!(quote.days, 7);
/// assert_eq!(quote.price.get(), 7_000);
/// ```
#[must_use]
pub fn custom_period_price(tariff: &Tariff, requested_days: u32) -> Option<CustomPeriodQuote> {
    if !tariff.custom_days.enabled {
        return None;
    }
    let daily = tariff.daily_price_kopeks?;
    let days = tariff.custom_days.clamp(requested_days);
    Some(CustomPeriodQuote { days, price: daily.saturating_mul(u64::from(days)) })
}

/// A priced custom traffic amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomTrafficQuote {
    /// Amount after clamping, in GB.
    pub gb: u64,
    /// Price for the whole amount.
    pub price: Kopeks,
}

/// Prices a custom traffic amount at the tariff's per-GB rate.
///
/// Returns `None` when the tariff does not offer custom traffic.
#[must_use]
pub fn custom_traffic_price(tariff: &Tariff, requested_gb: u64) -> Option<CustomTrafficQuote> {
    let option = &tariff.custom_traffic;
    if !option.enabled {
        return None;
    }
    let gb = option.clamp(requested_gb);
    Some(CustomTrafficQuote { gb, price: option.price_per_gb_kopeks.saturating_mul(gb) })
}
