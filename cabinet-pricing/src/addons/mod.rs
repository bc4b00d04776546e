//! Capacity add-ons for an existing subscription: traffic, devices and servers.

pub mod devices;
pub mod servers;
pub mod traffic;

pub use devices::{DeviceAddonCost, DeviceReduction, device_addon_cost, max_devices_to_add};
pub use servers::{ServerBaseline, ServerDiff, ServerEditSession};
pub use traffic::{can_topup_traffic, traffic_topup_price};
