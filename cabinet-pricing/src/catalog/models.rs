//! Catalog data models.
//!
//! These are read-only snapshots fetched from the cabinet backend once per
//! session. Field names follow the backend's JSON payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::custom::{CustomDaysOption, CustomTrafficOption};
use crate::money::Kopeks;

/// Identifier of a tariff (subscription plan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffId(i64);

impl TariffId {
    /// Wraps a raw backend id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a server (squad) a subscription can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    /// Wraps a server uuid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named subscription plan with one or more purchasable periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    /// Tariff identifier.
    pub id: TariffId,
    /// Display name.
    pub name: String,
    /// Optional marketing description.
    #[serde(default)]
    pub description: Option<String>,
    /// Purchasable periods, in catalog order.
    #[serde(default)]
    pub periods: Vec<TariffPeriod>,
    /// Flat price per day for daily and custom-length purchases.
    #[serde(default)]
    pub daily_price_kopeks: Option<Kopeks>,
    /// Devices included in the tariff.
    #[serde(default = "default_device_limit")]
    pub device_limit: u32,
    /// Upper bound on devices purchasable as add-ons.
    #[serde(default)]
    pub max_device_limit: Option<u32>,
    /// Traffic quota in GB; `0` means unlimited.
    #[serde(default)]
    pub traffic_limit_gb: u64,
    /// Custom period length support.
    #[serde(default)]
    pub custom_days: CustomDaysOption,
    /// Custom traffic amount support.
    #[serde(default)]
    pub custom_traffic: CustomTrafficOption,
    /// Promo group this tariff is restricted to, if any.
    #[serde(default)]
    pub promo_group_name: Option<String>,
}

const fn default_device_limit() -> u32 {
    1
}

impl Tariff {
    /// Returns the first period in catalog order.
    #[must_use]
    pub fn first_period(&self) -> Option<&TariffPeriod> {
        self.periods.first()
    }

    /// Looks up a period by its length in days.
    #[must_use]
    pub fn period(&self, days: u32) -> Option<&TariffPeriod> {
        self.periods.iter().find(|p| p.days == days)
    }

    /// Returns `true` if the tariff has a flat daily price.
    #[must_use]
    pub const fn is_daily(&self) -> bool {
        self.daily_price_kopeks.is_some()
    }

    /// Returns `true` if the tariff's traffic is unlimited.
    #[must_use]
    pub const fn has_unlimited_traffic(&self) -> bool {
        self.traffic_limit_gb == 0
    }
}

/// One purchasable period of a tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffPeriod {
    /// Period length in days.
    pub days: u32,
    /// Catalog price, possibly already discounted by the catalog.
    pub price_kopeks: Kopeks,
    /// Pre-discount price when the catalog applied its own discount.
    #[serde(default)]
    pub original_price_kopeks: Option<Kopeks>,
    /// Catalog-level discount percent, as reported by the backend.
    #[serde(default)]
    pub discount_percent: Option<i32>,
    /// Equivalent monthly price for display.
    #[serde(default)]
    pub price_per_month_kopeks: Option<Kopeks>,
    /// Pricing for devices beyond the included count.
    #[serde(default)]
    pub extra_devices: Option<ExtraDevicePricing>,
    /// Traffic choices for this period.
    #[serde(default)]
    pub traffic: TrafficSelection,
    /// Servers selectable for this period.
    #[serde(default)]
    pub servers: Vec<ServerOption>,
    /// Device count bounds for this period.
    #[serde(default)]
    pub devices: DeviceRange,
}

/// Per-device pricing for extra devices bought with a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDevicePricing {
    /// Price of one extra device for the whole period.
    pub price_per_device_kopeks: Kopeks,
}

/// Traffic choices offered with a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSelection {
    /// Whether the subscriber picks a traffic option.
    #[serde(default)]
    pub selectable: bool,
    /// Offered traffic options.
    #[serde(default)]
    pub options: Vec<TrafficOption>,
}

impl TrafficSelection {
    /// Finds the option for a traffic amount.
    #[must_use]
    pub fn option(&self, gb: u64) -> Option<&TrafficOption> {
        self.options.iter().find(|o| o.gb == gb)
    }

    /// Returns the option flagged as default, or the first one.
    #[must_use]
    pub fn default_option(&self) -> Option<&TrafficOption> {
        self.options.iter().find(|o| o.is_default).or_else(|| self.options.first())
    }
}

/// A traffic amount selectable during purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficOption {
    /// Traffic in GB; `0` means unlimited.
    pub gb: u64,
    /// Surcharge for this option on top of the period price.
    #[serde(default)]
    pub price_kopeks: Kopeks,
    /// Whether this option is preselected.
    #[serde(default)]
    pub is_default: bool,
}

/// A server the subscription can be connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOption {
    /// Server uuid.
    pub uuid: ServerId,
    /// Display name.
    pub name: String,
    /// Whether the server can currently be selected.
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Price of this server. For add-on sessions the backend prorates it to
    /// the subscription's remaining days.
    #[serde(default)]
    pub price_kopeks: Kopeks,
    /// ISO country code for display.
    #[serde(default)]
    pub country_code: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Bounds for the device count of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRange {
    /// Devices included in the period price.
    pub min: u32,
    /// Maximum purchasable devices.
    pub max: u32,
    /// Preselected device count.
    #[serde(default)]
    pub default: Option<u32>,
}

impl Default for DeviceRange {
    fn default() -> Self {
        Self { min: 1, max: 1, default: None }
    }
}

impl DeviceRange {
    /// Returns `true` if the subscriber can choose a device count.
    #[must_use]
    pub const fn is_adjustable(&self) -> bool {
        self.max > self.min
    }

    /// Clamps a requested device count into the range.
    #[must_use]
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.clamp(self.min, self.max.max(self.min))
    }

    /// Returns the initial device count for the wizard.
    #[must_use]
    pub fn initial(&self) -> u32 {
        self.clamp(self.default.unwrap_or(self.min))
    }
}

/// A traffic top-up package for an existing subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPackage {
    /// Traffic added, in GB.
    pub gb: u64,
    /// Package price, possibly already discounted by the catalog.
    pub price_kopeks: Kopeks,
    /// Catalog-level discount percent.
    #[serde(default)]
    pub discount_percent: Option<i32>,
    /// Undiscounted package price.
    #[serde(default)]
    pub base_price_kopeks: Option<Kopeks>,
}

/// Device add-on pricing for an existing subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePriceQuote {
    /// Price of one device for the rest of the current cycle.
    pub price_per_device_kopeks: Kopeks,
    /// Devices currently allowed.
    pub current_device_limit: u32,
    /// Upper bound on the device limit, if any.
    #[serde(default)]
    pub max_device_limit: Option<u32>,
    /// Lower bound when reducing devices.
    #[serde(default = "default_device_limit")]
    pub min_device_limit: u32,
    /// Days remaining in the current cycle.
    #[serde(default)]
    pub days_left: u32,
}

/// A subscriber's current subscription, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Current tariff; `None` for legacy subscriptions.
    #[serde(default)]
    pub tariff_id: Option<TariffId>,
    /// Whether this is a trial subscription.
    #[serde(default)]
    pub is_trial: bool,
    /// Whether this subscription is billed daily.
    #[serde(default)]
    pub is_daily: bool,
    /// When the subscription ends.
    pub end_date: DateTime<Utc>,
    /// Devices currently allowed.
    #[serde(default = "default_device_limit")]
    pub device_limit: u32,
    /// Traffic quota in GB; `0` means unlimited.
    #[serde(default)]
    pub traffic_limit_gb: u64,
    /// Traffic consumed in GB.
    #[serde(default)]
    pub traffic_used_gb: f64,
    /// Whether the subscription is active.
    #[serde(default)]
    pub is_active: bool,
    /// Whether the subscription has expired.
    #[serde(default)]
    pub is_expired: bool,
    /// Servers the subscription is connected to.
    #[serde(default)]
    pub connected_servers: Vec<ServerId>,
}

impl Subscription {
    /// Whole days remaining until `end_date`, zero once it has passed.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> u32 {
        let days = (self.end_date - now).num_days();
        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }

    /// Returns `true` if the traffic quota is unlimited.
    #[must_use]
    pub const fn has_unlimited_traffic(&self) -> bool {
        self.traffic_limit_gb == 0
    }
}
