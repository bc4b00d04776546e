//! Whether a subscription may switch tariffs.

use serde::{Deserialize, Serialize};

use crate::catalog::{Subscription, TariffId};

/// Coarse state of a subscriber's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// The subscriber has never subscribed.
    NoSubscription,
    /// A trial subscription.
    Trial,
    /// Expired or otherwise inactive.
    Expired,
    /// Active, on a known tariff.
    ActiveWithTariff,
    /// Active legacy subscription without a tariff.
    ActiveWithoutTariff,
}

impl SubscriptionState {
    /// Classifies a subscription.
    ///
    /// Trial takes precedence over expiry, so an expired trial is still
    /// [`Trial`](Self::Trial): it leads to a purchase, never to a switch.
    #[must_use]
    pub fn classify(subscription: Option<&Subscription>) -> Self {
        match subscription {
            None => Self::NoSubscription,
            Some(s) if s.is_trial => Self::Trial,
            Some(s) if s.is_expired || !s.is_active => Self::Expired,
            Some(s) if s.tariff_id.is_some() => Self::ActiveWithTariff,
            Some(_) => Self::ActiveWithoutTariff,
        }
    }

    /// Returns `true` only for states where switching is offered.
    #[must_use]
    pub const fn offers_switch(self) -> bool {
        matches!(self, Self::ActiveWithTariff)
    }
}

/// Returns `true` if the subscription may switch to `target`.
///
/// Requires an active, non-trial, non-expired subscription on a tariff other
/// than `target`.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{catalog::{Subscription, TariffId}, switch::can_switch};
///
/// let subscription: Subscription = serde_json::from_str(r#"{
///     "tariff_id": 1, "end_date": "2030-01-01T00:00:00Z",
///     "is_active": true, "is_expired": true
/// }"#).unwrap();
///
/// assert!(!can_switch(Some(&subscription), TariffId::new(2)));
/// ```
#[must_use]
pub fn can_switch(subscription: Option<&Subscription>, target: TariffId) -> bool {
    let Some(subscription) = subscription else {
        return false;
    };
    let Some(current) = subscription.tariff_id else {
        return false;
    };
    current != target
        && !subscription.is_trial
        && !subscription.is_expired
        && subscription.is_active
}
