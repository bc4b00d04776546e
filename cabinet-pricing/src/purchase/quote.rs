//! Purchase totals for a completed wizard selection.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{ServerId, Tariff, TariffId, TariffPeriod},
    error::{PricingError, Result},
    money::Kopeks,
    pricing::{
        DiscountedPrice, ExistingDiscount, PromoSnapshot, apply_discount_to_period,
        apply_with_catalog_fallback,
    },
};

/// What the subscriber picked in the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSelection {
    /// Chosen traffic option in GB; `None` takes the period's default option.
    #[serde(default)]
    pub traffic_gb: Option<u64>,
    /// Chosen servers.
    #[serde(default)]
    pub servers: Vec<ServerId>,
    /// Chosen device count; `None` takes the period's initial count.
    #[serde(default)]
    pub devices: Option<u32>,
}

/// Itemised price of a purchase, with the promo applied to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseQuote {
    /// Tariff being purchased.
    pub tariff_id: TariffId,
    /// Period length in days.
    pub period_days: u32,
    /// Catalog price of the period.
    pub period_price: Kopeks,
    /// Resolved traffic option, if the period offers any.
    pub traffic_gb: Option<u64>,
    /// Surcharge of the traffic option.
    pub traffic_price: Kopeks,
    /// Servers included, deduplicated in selection order.
    pub servers: Vec<ServerId>,
    /// Sum of the selected servers' prices.
    pub servers_price: Kopeks,
    /// Device count after clamping into the period range.
    pub devices: u32,
    /// Devices beyond the ones included in the period.
    pub extra_devices: u32,
    /// Price of the extra devices.
    pub devices_price: Kopeks,
    /// Sum of all items before the promo.
    pub subtotal: Kopeks,
    /// Amount to pay, with the crossed-out original if discounted.
    pub total: DiscountedPrice,
}

impl PurchaseQuote {
    /// Prices a selection against a tariff period.
    ///
    /// The device count is clamped into the period's range. Traffic options and
    /// servers must exist in the period and be available.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidSelection`] if the period is not part of
    /// the tariff, or the selection names a traffic option or server the period
    /// does not offer.
    pub fn build(
        tariff: &Tariff,
        period: &TariffPeriod,
        selection: &PurchaseSelection,
        promo: &PromoSnapshot,
    ) -> Result<Self> {
        if tariff.period(period.days).is_none() {
            return Err(PricingError::InvalidSelection(format!(
                "tariff {} has no {}-day period",
                tariff.id, period.days
            )));
        }

        let (traffic_gb, traffic_price) = resolve_traffic(period, selection.traffic_gb)?;
        let (servers, servers_price) = resolve_servers(period, &selection.servers)?;

        let devices = period.devices.clamp(selection.devices.unwrap_or_else(|| period.devices.initial()));
        let extra_devices = devices.saturating_sub(period.devices.min);
        let devices_price = period
            .extra_devices
            .map_or(Kopeks::ZERO, |pricing| {
                pricing.price_per_device_kopeks.saturating_mul(u64::from(extra_devices))
            });

        let extras = traffic_price.saturating_add(servers_price).saturating_add(devices_price);
        let subtotal = period.price_kopeks.saturating_add(extras);

        // Carry the period's catalog discount over to the whole purchase.
        let existing = apply_discount_to_period(period, &PromoSnapshot::inactive())
            .original
            .map_or(ExistingDiscount::None, |original| ExistingDiscount::Original {
                original_price: original.saturating_add(extras),
            });

        Ok(Self {
            tariff_id: tariff.id,
            period_days: period.days,
            period_price: period.price_kopeks,
            traffic_gb,
            traffic_price,
            servers,
            servers_price,
            devices,
            extra_devices,
            devices_price,
            subtotal,
            total: apply_with_catalog_fallback(subtotal, existing, promo),
        })
    }

    /// Amount to pay.
    #[must_use]
    pub const fn amount_due(&self) -> Kopeks {
        self.total.price
    }
}

fn resolve_traffic(period: &TariffPeriod, requested: Option<u64>) -> Result<(Option<u64>, Kopeks)> {
    let traffic = &period.traffic;
    if !traffic.selectable || traffic.options.is_empty() {
        return match requested {
            Some(gb) => Err(PricingError::InvalidSelection(format!(
                "{}-day period has no selectable traffic, got {gb} GB",
                period.days
            ))),
            None => Ok((None, Kopeks::ZERO)),
        };
    }

    let option = match requested {
        Some(gb) => traffic.option(gb).ok_or_else(|| {
            PricingError::InvalidSelection(format!("traffic option {gb} GB is not offered"))
        })?,
        None => traffic
            .default_option()
            .ok_or_else(|| PricingError::InvalidSelection("no traffic option offered".into()))?,
    };
    Ok((Some(option.gb), option.price_kopeks))
}

fn resolve_servers(period: &TariffPeriod, requested: &[ServerId]) -> Result<(Vec<ServerId>, Kopeks)> {
    let mut servers: Vec<ServerId> = Vec::with_capacity(requested.len());
    let mut price = Kopeks::ZERO;

    for id in requested {
        if servers.contains(id) {
            continue;
        }
        let server = period
            .servers
            .iter()
            .find(|server| &server.uuid == id && server.is_available)
            .ok_or_else(|| PricingError::InvalidSelection(format!("server {id} is not available")))?;
        price = price.saturating_add(server.price_kopeks);
        servers.push(id.clone());
    }

    Ok((servers, price))
}
