//! Recovery from a failed tariff switch.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::{Tariff, TariffId},
    error::{PricingError, ServiceFailure},
};

/// What to do after a switch submission failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchResolution {
    /// The subscription expired; continue as a new purchase of the target.
    PurchaseFlow {
        /// Tariff to preselect.
        tariff_id: TariffId,
        /// Period to preselect: the tariff's first period.
        period_days: u32,
    },
    /// Show the failure to the subscriber; retrying is up to them.
    Failed {
        /// Message for the subscriber.
        message: String,
    },
}

/// Decides how to recover from a switch failure.
///
/// Only an expired-subscription rejection that asks for the purchase flow is
/// recovered automatically, and only when the target tariff has a period to
/// seed the purchase with.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{
///     catalog::{Tariff, TariffId},
///     error::{PricingError, ServiceFailure},
///     switch::{SwitchResolution, resolve_switch_failure},
/// };
///
/// let target: Tariff = serde_json::from_str(r#"{
///     "id": 2, "name": "Pro",
///     "periods": [{ "days": 30, "price_kopeks": 30000 }, { "days": 90, "price_kopeks": 80000 }]
/// }"#).unwrap();
/// let error = PricingError::Service(ServiceFailure::SubscriptionExpired { use_purchase_flow: true });
///
/// assert_eq!(
///     resolve_switch_failure(&error, &target),
///     SwitchResolution::PurchaseFlow { tariff_id: TariffId::new(2), period_days: 30 },
/// );
/// ```
#[must_use]
pub fn resolve_switch_failure(error: &PricingError, target: &Tariff) -> SwitchResolution {
    if error.service_failure().is_some_and(ServiceFailure::requests_purchase_flow)
        && let Some(period) = target.first_period()
    {
        info!(
            tariff_id = %target.id,
            period_days = period.days,
            "subscription expired during switch, continuing with purchase flow"
        );
        return SwitchResolution::PurchaseFlow { tariff_id: target.id, period_days: period.days };
    }

    let message = match error.service_failure() {
        Some(failure) => failure.user_message(),
        None => error.to_string(),
    };
    SwitchResolution::Failed { message }
}
