//! External cabinet backend: the [`CabinetApi`] seam, wire payloads and an HTTP client.

pub mod api;
pub mod http;
pub mod models;

pub use api::CabinetApi;
pub use http::HttpCabinetClient;
pub use models::{
    DeviceAddRequest, DeviceReduceRequest, MutationResult, PurchaseRequest, ServerUpdateRequest,
    SwitchRequest, TrafficPurchaseRequest, decode_failure,
};
