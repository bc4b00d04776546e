//! The cabinet backend seam.

use crate::{
    catalog::{DevicePriceQuote, ServerOption, Subscription, Tariff, TariffId, TrafficPackage},
    error::Result,
    pricing::PromoSnapshot,
    switch::SwitchPreview,
};

use super::models::{
    DeviceAddRequest, DeviceReduceRequest, MutationResult, PurchaseRequest, ServerUpdateRequest,
    SwitchRequest, TrafficPurchaseRequest,
};

/// Operations the engine consumes from the cabinet backend.
///
/// The backend owns the catalog, balances and the ledger. The engine reads
/// catalog snapshots and previews from it and forwards final selections; it
/// never decides whether a purchase succeeded.
///
/// Rejections are reported as [`PricingError::Service`](crate::error::PricingError::Service).
/// Implementations must not retry on their own.
pub trait CabinetApi: Send + Sync {
    /// Fetches the tariff catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn tariffs(&self) -> impl Future<Output = Result<Vec<Tariff>>> + Send;

    /// Fetches the subscriber's promo discount.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn promo_discount(&self) -> impl Future<Output = Result<PromoSnapshot>> + Send;

    /// Fetches the subscriber's current subscription, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn subscription(&self) -> impl Future<Output = Result<Option<Subscription>>> + Send;

    /// Asks the backend for the cost of switching to `target`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the switch.
    fn preview_switch(&self, target: TariffId) -> impl Future<Output = Result<SwitchPreview>> + Send;

    /// Switches the subscription to another tariff.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the switch.
    fn switch_tariff<'a>(
        &'a self,
        request: &'a SwitchRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;

    /// Buys a subscription period.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the purchase.
    fn purchase<'a>(
        &'a self,
        request: &'a PurchaseRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;

    /// Fetches the traffic packages on offer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn traffic_packages(&self) -> impl Future<Output = Result<Vec<TrafficPackage>>> + Send;

    /// Buys a traffic package.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the purchase.
    fn purchase_traffic<'a>(
        &'a self,
        request: &'a TrafficPurchaseRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;

    /// Fetches device add-on pricing for the current subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn device_price(&self) -> impl Future<Output = Result<DevicePriceQuote>> + Send;

    /// Raises the device limit.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the change.
    fn add_devices<'a>(
        &'a self,
        request: &'a DeviceAddRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;

    /// Lowers the device limit.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the change.
    fn reduce_devices<'a>(
        &'a self,
        request: &'a DeviceReduceRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;

    /// Fetches servers with prices prorated to the current subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    fn server_options(&self) -> impl Future<Output = Result<Vec<ServerOption>>> + Send;

    /// Replaces the connected servers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the change.
    fn update_servers<'a>(
        &'a self,
        request: &'a ServerUpdateRequest,
    ) -> impl Future<Output = Result<MutationResult>> + Send + 'a;
}
