//! Tariff catalog snapshots supplied by the cabinet backend.

pub mod custom;
pub mod models;

pub use custom::{
    CustomDaysOption, CustomPeriodQuote, CustomTrafficOption, CustomTrafficQuote,
    custom_period_price, custom_traffic_price,
};
pub use models::{
    DevicePriceQuote, DeviceRange, ExtraDevicePricing, ServerId, ServerOption, Subscription,
    Tariff, TariffId, TariffPeriod, TrafficOption, TrafficPackage, TrafficSelection,
};
