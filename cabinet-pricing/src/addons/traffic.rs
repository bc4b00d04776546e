//! Traffic top-ups for an existing subscription.
//!
//! Packages are flat-priced: the price never depends on the days left in the
//! current cycle.

use crate::{
    catalog::{Subscription, TrafficPackage},
    pricing::{DiscountedPrice, PromoSnapshot, apply_discount_to_package},
};

/// Display price of a traffic package with the promo applied.
///
/// A package whose `base_price_kopeks` exceeds its price is treated as already
/// discounted by the catalog, and the base price is kept as the original.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{
///     addons::traffic_topup_price,
///     catalog::TrafficPackage,
///     money::Kopeks,
///     pricing::PromoSnapshot,
/// };
///
/// let package = TrafficPackage {
///     gb: 50,
///     price_kopeks: Kopeks::new(9_000),
///     discount_percent: Some(10),
///     base_price_kopeks: Some(Kopeks::new(10_000)),
/// };
///
/// let price = traffic_topup_price(&package, &PromoSnapshot::active(20));
/// assert_eq!(price.price, Kopeks::new(7_200));
/// assert_eq!(price.original, Some(Kopeks::new(10_000)));
/// ```
#[must_use]
pub fn traffic_topup_price(package: &TrafficPackage, promo: &PromoSnapshot) -> DiscountedPrice {
    apply_discount_to_package(package, promo)
}

/// Returns `true` if the subscription can buy extra traffic.
///
/// Unlimited subscriptions have nothing to top up; trial and expired
/// subscriptions are excluded as well.
#[must_use]
pub fn can_topup_traffic(subscription: &Subscription) -> bool {
    subscription.is_active
        && !subscription.is_expired
        && !subscription.is_trial
        && !subscription.has_unlimited_traffic()
}
