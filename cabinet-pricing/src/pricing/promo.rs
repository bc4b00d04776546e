//! Promotional discount application without double counting.
//!
//! A promo discount is a session-scoped percentage applied on top of any
//! catalog-level discount. When the catalog already discounted a price, the
//! result keeps the catalog's original price and reports one combined percent,
//! so the subscriber sees a single truthful saving instead of two stacked badges.
//!
//! The result always satisfies `price <= input price <= original`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    catalog::{TariffPeriod, TrafficPackage},
    money::{Kopeks, round_half_away},
};

/// Point-in-time read of the subscriber's promo discount.
///
/// The engine never polls or expires a snapshot; `expires_at` is informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSnapshot {
    /// Whether the discount is active.
    #[serde(default)]
    pub is_active: bool,
    /// Discount percent as reported by the backend.
    #[serde(default)]
    pub discount_percent: Option<i32>,
    /// When the backend will expire the discount.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PromoSnapshot {
    /// An active promo with the given percent.
    #[must_use]
    pub const fn active(percent: i32) -> Self {
        Self { is_active: true, discount_percent: Some(percent), expires_at: None }
    }

    /// An inactive promo.
    #[must_use]
    pub const fn inactive() -> Self {
        Self { is_active: false, discount_percent: None, expires_at: None }
    }

    /// Returns the percent to apply, or `None` if the promo does not apply.
    ///
    /// A percent outside `[0, 100]` is treated as inactive rather than clamped,
    /// and logged.
    #[must_use]
    pub fn effective_percent(&self) -> Option<u8> {
        if !self.is_active {
            return None;
        }
        let percent = self.discount_percent?;
        match u8::try_from(percent) {
            Ok(valid) if valid <= 100 => Some(valid),
            _ => {
                warn!(discount_percent = percent, "ignoring out-of-range promo discount");
                None
            }
        }
    }
}

/// A discount the catalog already applied to a price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingDiscount {
    /// The price is undiscounted.
    #[default]
    None,
    /// The catalog reports a percent but no original price.
    FlatPercent {
        /// Catalog discount percent.
        percent: u8,
    },
    /// The catalog reports the pre-discount price.
    Original {
        /// Price before the catalog discount.
        original_price: Kopeks,
    },
}

impl ExistingDiscount {
    /// Builds the existing discount from catalog fields.
    ///
    /// An explicit original price wins over a bare percent. Percents outside
    /// `[1, 99]` carry no usable information and are ignored.
    #[must_use]
    pub fn from_catalog(original_price: Option<Kopeks>, discount_percent: Option<i32>) -> Self {
        if let Some(original_price) = original_price {
            return Self::Original { original_price };
        }
        match discount_percent.and_then(|p| u8::try_from(p).ok()) {
            Some(percent @ 1..=99) => Self::FlatPercent { percent },
            _ => Self::None,
        }
    }

    /// Returns the catalog original for `price`, only when it exceeds `price`.
    fn original_for(self, price: Kopeks) -> Option<Kopeks> {
        let original = match self {
            Self::None => return None,
            Self::Original { original_price } => original_price,
            Self::FlatPercent { percent } if (1..=99).contains(&percent) => {
                let remaining = Decimal::from(100 - percent);
                Kopeks::from_decimal_rounded(price.to_decimal() * Decimal::ONE_HUNDRED / remaining)
            }
            Self::FlatPercent { .. } => return None,
        };
        (original > price).then_some(original)
    }
}

/// A price ready for display, with an optional crossed-out original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountedPrice {
    /// Price the subscriber pays.
    pub price: Kopeks,
    /// Price to show crossed out, if discounted.
    pub original: Option<Kopeks>,
    /// Total saving percent relative to `original`.
    pub percent: Option<u8>,
}

impl DiscountedPrice {
    /// A price with no discount.
    #[must_use]
    pub const fn undiscounted(price: Kopeks) -> Self {
        Self { price, original: None, percent: None }
    }

    /// Returns `true` if there is an original to show.
    #[must_use]
    pub const fn has_discount(&self) -> bool {
        self.original.is_some()
    }

    /// Amount saved relative to the original.
    #[must_use]
    pub fn savings(&self) -> Kopeks {
        self.original.map_or(Kopeks::ZERO, |original| original.saturating_sub(self.price))
    }
}

/// Applies a promo discount to a price.
///
/// Total function: never fails and never panics. An inactive promo, or one
/// without a valid percent, returns the price unchanged with no original.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{
///     money::Kopeks,
///     pricing::{ExistingDiscount, PromoSnapshot, apply_discount},
/// };
///
/// // Catalog already discounted 1000 -> 900; a 20% promo combines to 28% off.
/// let result = apply_discount(
///     Kopeks::new(900),
///     ExistingDiscount::Original { original_price: Kopeks::new(1_000) },
///     &PromoSnapshot::active(20),
/// );
/// assert_eq!(result.price, Kopeks::new(720));
/// assert_eq!(result.original, Some(Kopeks::new(1_000)));
/// assert_eq!(result.percent, Some(28));
/// ```
#[must_use]
pub fn apply_discount(
    price: Kopeks,
    existing: ExistingDiscount,
    promo: &PromoSnapshot,
) -> DiscountedPrice {
    let Some(percent) = promo.effective_percent() else {
        return DiscountedPrice::undiscounted(price);
    };

    let discounted = discount_by_percent(price, percent);

    match existing.original_for(price) {
        Some(original) => DiscountedPrice {
            price: discounted,
            original: Some(original),
            percent: Some(combined_percent(discounted, original)),
        },
        None => DiscountedPrice { price: discounted, original: Some(price), percent: Some(percent) },
    }
}

/// Display price of a tariff period with the catalog discount and the promo.
#[must_use]
pub fn apply_discount_to_period(period: &TariffPeriod, promo: &PromoSnapshot) -> DiscountedPrice {
    let existing =
        ExistingDiscount::from_catalog(period.original_price_kopeks, period.discount_percent);
    apply_with_catalog_fallback(period.price_kopeks, existing, promo)
}

/// Display price of a traffic package with the catalog discount and the promo.
#[must_use]
pub fn apply_discount_to_package(package: &TrafficPackage, promo: &PromoSnapshot) -> DiscountedPrice {
    let existing =
        ExistingDiscount::from_catalog(package.base_price_kopeks, package.discount_percent);
    apply_with_catalog_fallback(package.price_kopeks, existing, promo)
}

/// Applies the promo; without one, still shows the catalog's own discount.
pub(crate) fn apply_with_catalog_fallback(
    price: Kopeks,
    existing: ExistingDiscount,
    promo: &PromoSnapshot,
) -> DiscountedPrice {
    let promoted = apply_discount(price, existing, promo);
    if promoted.has_discount() {
        return promoted;
    }
    catalog_price(price, existing)
}

/// Display price carrying only the catalog's own discount.
fn catalog_price(price: Kopeks, existing: ExistingDiscount) -> DiscountedPrice {
    match existing.original_for(price) {
        Some(original) => DiscountedPrice {
            price,
            original: Some(original),
            percent: Some(combined_percent(price, original)),
        },
        None => DiscountedPrice::undiscounted(price),
    }
}

/// `round(price * (100 - percent) / 100)`, half away from zero.
pub(crate) fn discount_by_percent(price: Kopeks, percent: u8) -> Kopeks {
    if price.is_zero() {
        return Kopeks::ZERO;
    }
    let remaining = Decimal::from(100 - u32::from(percent.min(100)));
    Kopeks::from_decimal_rounded(price.to_decimal() * remaining / Decimal::ONE_HUNDRED)
}

/// `round((1 - discounted / original) * 100)`; callers guarantee `original > 0`.
fn combined_percent(discounted: Kopeks, original: Kopeks) -> u8 {
    let saved = original.saturating_sub(discounted).to_decimal();
    let percent = round_half_away(saved * Decimal::ONE_HUNDRED / original.to_decimal());
    u8::try_from(percent.min(100)).unwrap_or(100)
}
