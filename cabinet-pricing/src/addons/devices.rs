//! Device limit changes for an existing subscription.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::DevicePriceQuote,
    error::{PricingError, Result},
    money::Kopeks,
};

/// Cost of raising the device limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddonCost {
    /// Devices being added.
    pub devices_to_add: u32,
    /// Device limit after the purchase.
    pub new_limit: u32,
    /// Total price for the rest of the current cycle.
    pub price: Kopeks,
}

/// Number of devices that can still be added, `None` if unbounded.
#[must_use]
pub fn max_devices_to_add(quote: &DevicePriceQuote) -> Option<u32> {
    quote.max_device_limit.map(|max| max.saturating_sub(quote.current_device_limit))
}

/// Prices adding `devices_to_add` devices at the catalog's per-device rate.
///
/// # Errors
///
/// Returns [`PricingError::InvalidSelection`] when `devices_to_add` is zero or
/// would take the limit beyond `max_device_limit`.
pub fn device_addon_cost(quote: &DevicePriceQuote, devices_to_add: u32) -> Result<DeviceAddonCost> {
    if devices_to_add == 0 {
        return Err(PricingError::InvalidSelection("must add at least one device".into()));
    }

    let new_limit = quote.current_device_limit.saturating_add(devices_to_add);
    if let Some(max) = quote.max_device_limit
        && new_limit > max
    {
        return Err(PricingError::InvalidSelection(format!(
            "device limit {new_limit} exceeds maximum {max}"
        )));
    }

    Ok(DeviceAddonCost {
        devices_to_add,
        new_limit,
        price: quote.price_per_device_kopeks.saturating_mul(u64::from(devices_to_add)),
    })
}

/// State of a device reduction flow.
///
/// The target always lies in `[min, current - 1]`: a reduction can neither
/// leave the limit unchanged nor go below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceReduction {
    current: u32,
    min: u32,
    target: u32,
}

impl DeviceReduction {
    /// Starts a reduction with the target at `max(min, current - 1)`.
    ///
    /// Returns `None` when `current <= min`, as nothing can be removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabinet_pricing::addons::DeviceReduction;
    ///
    /// let reduction = DeviceReduction::init(5, 1).unwrap();
    /// assert_eq!(reduction.target(), 4);
    ///
    /// assert!(DeviceReduction::init(1, 1).is_none());
    /// ```
    #[must_use]
    pub fn init(current: u32, min: u32) -> Option<Self> {
        if current <= min {
            return None;
        }
        Some(Self { current, min, target: min.max(current - 1) })
    }

    /// Starts a reduction from a backend device quote.
    #[must_use]
    pub fn from_quote(quote: &DevicePriceQuote) -> Option<Self> {
        Self::init(quote.current_device_limit, quote.min_device_limit)
    }

    /// Sets the target, clamped into `[min, current - 1]`; returns the result.
    pub fn set_target(&mut self, requested: u32) -> u32 {
        self.target = requested.clamp(self.min, self.current - 1);
        self.target
    }

    /// Device limit after the reduction.
    #[must_use]
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// Device limit before the reduction.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Lowest allowed target.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Devices being removed.
    #[must_use]
    pub const fn devices_removed(&self) -> u32 {
        self.current - self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(current: u32, max: Option<u32>) -> DevicePriceQuote {
        DevicePriceQuote {
            price_per_device_kopeks: Kopeks::new(4_500),
            current_device_limit: current,
            max_device_limit: max,
            min_device_limit: 1,
            days_left: 20,
        }
    }

    #[test]
    fn test_addon_cost() {
        let cost = device_addon_cost(&quote(3, Some(10)), 2).unwrap();
        assert_eq!(cost, DeviceAddonCost { devices_to_add: 2, new_limit: 5, price: Kopeks::new(9_000) });
    }

    #[test]
    fn test_addon_up_to_max() {
        assert!(device_addon_cost(&quote(3, Some(5)), 2).is_ok());
        let err = device_addon_cost(&quote(3, Some(5)), 3).unwrap_err();
        assert!(matches!(err, PricingError::InvalidSelection(_)));
    }

    #[test]
    fn test_addon_unbounded() {
        assert_eq!(max_devices_to_add(&quote(3, None)), None);
        assert!(device_addon_cost(&quote(3, None), 40).is_ok());
    }

    #[test]
    fn test_addon_zero_rejected() {
        assert!(device_addon_cost(&quote(3, None), 0).is_err());
    }

    #[test]
    fn test_max_devices_to_add() {
        assert_eq!(max_devices_to_add(&quote(3, Some(5))), Some(2));
        assert_eq!(max_devices_to_add(&quote(7, Some(5))), Some(0));
    }

    #[test]
    fn test_reduction_initial_target() {
        let reduction = DeviceReduction::init(5, 1).unwrap();
        assert_eq!(reduction.target(), 4);
        assert_eq!(reduction.devices_removed(), 1);
    }

    #[test]
    fn test_reduction_at_floor() {
        assert!(DeviceReduction::init(2, 2).is_none());
        assert!(DeviceReduction::init(1, 3).is_none());
        assert_eq!(DeviceReduction::init(3, 2).unwrap().target(), 2);
    }

    #[test]
    fn test_reduction_set_target_clamped() {
        let mut reduction = DeviceReduction::init(6, 2).unwrap();
        assert_eq!(reduction.set_target(0), 2);
        assert_eq!(reduction.set_target(6), 5);
        assert_eq!(reduction.set_target(4), 4);
        assert_eq!(reduction.devices_removed(), 2);
    }

    #[test]
    fn test_reduction_from_quote() {
        let mut q = quote(4, None);
        q.min_device_limit = 2;
        let reduction = DeviceReduction::from_quote(&q).unwrap();
        assert_eq!((reduction.min(), reduction.current(), reduction.target()), (2, 4, 3));
    }
}
