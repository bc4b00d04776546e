//! Switch previews and their keying by target tariff.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::TariffId,
    money::Kopeks,
    pricing::{
        BalanceCheck, DiscountedPrice, ExistingDiscount, PromoSnapshot, apply_with_catalog_fallback,
    },
};

/// Authoritative switch cost, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPreview {
    /// Name of the current tariff.
    pub current_tariff_name: String,
    /// Name of the target tariff.
    pub new_tariff_name: String,
    /// Days left in the current cycle, carried over to the new tariff.
    pub remaining_days: u32,
    /// Cost to pay now; zero for downgrades.
    pub upgrade_cost_kopeks: Kopeks,
    /// Cost before the promo discount, if one applied.
    #[serde(default)]
    pub base_upgrade_cost_kopeks: Option<Kopeks>,
    /// Discount percent the backend applied.
    #[serde(default)]
    pub discount_percent: Option<i32>,
    /// Whether the balance covers the cost.
    pub has_enough_balance: bool,
    /// Amount to top up first.
    #[serde(default)]
    pub missing_amount_kopeks: Kopeks,
    /// Whether the backend allows the switch.
    #[serde(default = "default_can_switch")]
    pub can_switch: bool,
}

const fn default_can_switch() -> bool {
    true
}

impl SwitchPreview {
    /// Returns `true` if the switch costs anything.
    #[must_use]
    pub const fn is_upgrade(&self) -> bool {
        !self.upgrade_cost_kopeks.is_zero()
    }

    /// Display price, with the pre-discount cost crossed out when present.
    #[must_use]
    pub fn display_price(&self) -> DiscountedPrice {
        let existing =
            ExistingDiscount::from_catalog(self.base_upgrade_cost_kopeks, self.discount_percent);
        apply_with_catalog_fallback(self.upgrade_cost_kopeks, existing, &PromoSnapshot::inactive())
    }

    /// Balance sufficiency as reported by the backend.
    #[must_use]
    pub const fn balance_check(&self) -> BalanceCheck {
        BalanceCheck {
            has_enough_balance: self.has_enough_balance,
            missing_amount_kopeks: self.missing_amount_kopeks,
        }
    }
}

/// Holds at most one preview, keyed by the tariff it was computed for.
///
/// A preview for one tariff is never shown or submitted for another: changing
/// the target drops the stored value, and responses that arrive for a stale
/// target are discarded.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{catalog::TariffId, switch::PreviewSlot};
///
/// let mut slot = PreviewSlot::new();
/// slot.select_target(TariffId::new(2));
/// assert!(slot.store(TariffId::new(2), "preview for 2"));
///
/// slot.select_target(TariffId::new(3));
/// assert!(slot.get(TariffId::new(2)).is_none());
/// assert!(!slot.store(TariffId::new(2), "late response"));
/// ```
#[derive(Debug, Clone)]
pub struct PreviewSlot<T> {
    target: Option<TariffId>,
    preview: Option<T>,
}

impl<T> Default for PreviewSlot<T> {
    fn default() -> Self {
        Self { target: None, preview: None }
    }
}

impl<T> PreviewSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target tariff; a preview for any other tariff is discarded.
    pub fn select_target(&mut self, target: TariffId) {
        if self.target != Some(target) {
            self.preview = None;
        }
        self.target = Some(target);
    }

    /// Current target tariff.
    #[must_use]
    pub const fn target(&self) -> Option<TariffId> {
        self.target
    }

    /// Returns `true` when another tariff than `target` is selected.
    ///
    /// An empty slot selects nothing, so it conflicts with no target.
    #[must_use]
    pub fn selects_other_than(&self, target: TariffId) -> bool {
        self.target.is_some_and(|selected| selected != target)
    }

    /// Stores a preview computed for `target`.
    ///
    /// Returns `false` and drops the value when `target` is no longer the
    /// selected one.
    pub fn store(&mut self, target: TariffId, preview: T) -> bool {
        if self.target != Some(target) {
            return false;
        }
        self.preview = Some(preview);
        true
    }

    /// Returns the preview if it was computed for `target`.
    #[must_use]
    pub fn get(&self, target: TariffId) -> Option<&T> {
        if self.target == Some(target) { self.preview.as_ref() } else { None }
    }

    /// Takes the preview if it was computed for `target`.
    pub fn take_for(&mut self, target: TariffId) -> Option<T> {
        if self.target == Some(target) { self.preview.take() } else { None }
    }

    /// Forgets the target and any preview.
    pub fn clear(&mut self) {
        self.target = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(cost: u64, base: Option<u64>) -> SwitchPreview {
        SwitchPreview {
            current_tariff_name: "Basic".into(),
            new_tariff_name: "Pro".into(),
            remaining_days: 14,
            upgrade_cost_kopeks: Kopeks::new(cost),
            base_upgrade_cost_kopeks: base.map(Kopeks::new),
            discount_percent: None,
            has_enough_balance: false,
            missing_amount_kopeks: Kopeks::new(500),
            can_switch: true,
        }
    }

    #[test]
    fn test_preview_deserialize_defaults() {
        let json = r#"{
            "current_tariff_name": "Basic",
            "new_tariff_name": "Pro",
            "remaining_days": 10,
            "upgrade_cost_kopeks": 15000,
            "has_enough_balance": true
        }"#;
        let preview: SwitchPreview = serde_json::from_str(json).unwrap();
        assert!(preview.can_switch);
        assert!(preview.is_upgrade());
        assert_eq!(preview.missing_amount_kopeks, Kopeks::ZERO);
    }

    #[test]
    fn test_display_price_with_base() {
        let price = preview(8_000, Some(10_000)).display_price();
        assert_eq!(price.price, Kopeks::new(8_000));
        assert_eq!(price.original, Some(Kopeks::new(10_000)));
        assert_eq!(price.percent, Some(20));
    }

    #[test]
    fn test_downgrade_is_free() {
        let preview = preview(0, None);
        assert!(!preview.is_upgrade());
        assert_eq!(preview.display_price(), DiscountedPrice::undiscounted(Kopeks::ZERO));
    }

    #[test]
    fn test_balance_check_from_payload() {
        let check = preview(8_000, None).balance_check();
        assert!(!check.has_enough_balance);
        assert_eq!(check.missing_amount_kopeks, Kopeks::new(500));
    }

    #[test]
    fn test_slot_keyed_by_target() {
        let mut slot = PreviewSlot::new();
        assert!(!slot.store(TariffId::new(1), 10));

        slot.select_target(TariffId::new(1));
        assert!(slot.store(TariffId::new(1), 10));
        assert_eq!(slot.get(TariffId::new(1)), Some(&10));
        assert_eq!(slot.get(TariffId::new(2)), None);

        // Reselecting the same target keeps the preview.
        slot.select_target(TariffId::new(1));
        assert_eq!(slot.get(TariffId::new(1)), Some(&10));

        slot.select_target(TariffId::new(2));
        assert_eq!(slot.get(TariffId::new(1)), None);
        assert_eq!(slot.get(TariffId::new(2)), None);
    }

    #[test]
    fn test_take_for_consumes() {
        let mut slot = PreviewSlot::new();
        slot.select_target(TariffId::new(5));
        slot.store(TariffId::new(5), "p");

        assert_eq!(slot.take_for(TariffId::new(6)), None);
        assert_eq!(slot.take_for(TariffId::new(5)), Some("p"));
        assert_eq!(slot.take_for(TariffId::new(5)), None);
        assert_eq!(slot.target(), Some(TariffId::new(5)));

        slot.clear();
        assert_eq!(slot.target(), None);
    }

    #[test]
    fn test_selects_other_than() {
        let mut slot = PreviewSlot::<u32>::new();
        assert!(!slot.selects_other_than(TariffId::new(2)));

        slot.select_target(TariffId::new(2));
        assert!(!slot.selects_other_than(TariffId::new(2)));

        slot.select_target(TariffId::new(3));
        assert!(slot.selects_other_than(TariffId::new(2)));
    }
}
