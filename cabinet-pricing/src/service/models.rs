//! Wire payloads exchanged with the cabinet backend.
//!
//! Every mutation request carries a fresh idempotency key, so a request that
//! reached the backend twice is applied once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    addons::{DeviceAddonCost, DeviceReduction, ServerEditSession},
    catalog::{ServerId, ServerOption, Subscription, Tariff, TariffId, TrafficPackage},
    error::ServiceFailure,
    money::Kopeks,
    purchase::PurchaseQuote,
};

/// Request to switch the current subscription to another tariff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRequest {
    /// Target tariff.
    pub tariff_id: TariffId,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl SwitchRequest {
    /// Creates a request with a fresh idempotency key.
    #[must_use]
    pub fn new(tariff_id: TariffId) -> Self {
        Self { tariff_id, idempotency_key: Uuid::new_v4() }
    }
}

/// Request to buy a new subscription period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Tariff being purchased.
    pub tariff_id: TariffId,
    /// Period length in days.
    pub period_days: u32,
    /// Chosen traffic option, if the period offers any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_gb: Option<u64>,
    /// Chosen servers.
    #[serde(default)]
    pub servers: Vec<ServerId>,
    /// Device count.
    pub devices: u32,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl PurchaseRequest {
    /// Builds the request for a priced selection.
    #[must_use]
    pub fn from_quote(quote: &PurchaseQuote) -> Self {
        Self {
            tariff_id: quote.tariff_id,
            period_days: quote.period_days,
            traffic_gb: quote.traffic_gb,
            servers: quote.servers.clone(),
            devices: quote.devices,
            idempotency_key: Uuid::new_v4(),
        }
    }

    /// Purchase of a tariff period with every option left to the backend.
    #[must_use]
    pub fn for_period(tariff_id: TariffId, period_days: u32, devices: u32) -> Self {
        Self {
            tariff_id,
            period_days,
            traffic_gb: None,
            servers: Vec::new(),
            devices,
            idempotency_key: Uuid::new_v4(),
        }
    }
}

/// Request to buy a traffic package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPurchaseRequest {
    /// Package size in GB.
    pub gb: u64,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl TrafficPurchaseRequest {
    /// Creates a request for a package.
    #[must_use]
    pub fn new(package: &TrafficPackage) -> Self {
        Self { gb: package.gb, idempotency_key: Uuid::new_v4() }
    }
}

/// Request to raise the device limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddRequest {
    /// Devices to add.
    pub devices: u32,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl DeviceAddRequest {
    /// Creates a request from a priced add-on.
    #[must_use]
    pub fn new(cost: &DeviceAddonCost) -> Self {
        Self { devices: cost.devices_to_add, idempotency_key: Uuid::new_v4() }
    }
}

/// Request to lower the device limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceReduceRequest {
    /// Device limit after the reduction.
    pub new_device_limit: u32,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl DeviceReduceRequest {
    /// Creates a request for the reduction's current target.
    #[must_use]
    pub fn new(reduction: &DeviceReduction) -> Self {
        Self { new_device_limit: reduction.target(), idempotency_key: Uuid::new_v4() }
    }
}

/// Request to replace the connected servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerUpdateRequest {
    /// Full set of servers to be connected.
    pub servers: Vec<ServerId>,
    /// Deduplication key for this submission.
    pub idempotency_key: Uuid,
}

impl ServerUpdateRequest {
    /// Creates a request for the session's live selection.
    #[must_use]
    pub fn new(session: &ServerEditSession) -> Self {
        Self { servers: session.selected(), idempotency_key: Uuid::new_v4() }
    }
}

/// Outcome of an accepted mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    /// Whether the backend applied the change.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Message for the subscriber.
    #[serde(default)]
    pub message: Option<String>,
    /// Amount charged.
    #[serde(default)]
    pub charged_kopeks: Option<Kopeks>,
    /// Balance after the change.
    #[serde(default)]
    pub balance_kopeks: Option<Kopeks>,
}

const fn default_success() -> bool {
    true
}

/// Envelope of the tariff list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TariffsResponse {
    pub tariffs: Vec<Tariff>,
}

/// Envelope of the traffic package list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrafficPackagesResponse {
    pub packages: Vec<TrafficPackage>,
}

/// Envelope of the add-on server list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServersResponse {
    pub servers: Vec<ServerOption>,
}

/// Envelope of the current subscription.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubscriptionResponse {
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FailurePayload {
    code: Option<String>,
    error_code: Option<String>,
    #[serde(alias = "required_kopeks")]
    required: Option<Kopeks>,
    #[serde(alias = "balance_kopeks")]
    balance: Option<Kopeks>,
    #[serde(alias = "missing_amount_kopeks")]
    missing_amount: Option<Kopeks>,
    use_purchase_flow: bool,
    message: Option<String>,
}

/// Decodes the body of a non-2xx response.
///
/// The failure fields may sit at the top level or be nested under `detail`;
/// a string `detail` is taken as the message. Bodies that are not JSON become
/// [`ServiceFailure::Other`] with the raw text.
///
/// # Examples
///
/// ```
/// use cabinet_pricing::{error::ServiceFailure, service::decode_failure};
///
/// let body = br#"{"detail": {"error_code": "subscription_expired", "use_purchase_flow": true}}"#;
/// assert_eq!(
///     decode_failure(400, body),
///     ServiceFailure::SubscriptionExpired { use_purchase_flow: true },
/// );
/// ```
#[must_use]
pub fn decode_failure(status: u16, body: &[u8]) -> ServiceFailure {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        let message = String::from_utf8_lossy(body).trim().to_owned();
        return ServiceFailure::Other { status, message };
    };

    let (payload, detail_message) = match value.get("detail") {
        Some(Value::String(message)) => (FailurePayload::default(), Some(message.clone())),
        Some(detail @ Value::Object(_)) => (parse_payload(detail), None),
        _ => (parse_payload(&value), None),
    };

    match (payload.code.as_deref(), payload.error_code.as_deref()) {
        (Some("insufficient_balance" | "insufficient_funds"), _)
        | (_, Some("insufficient_balance" | "insufficient_funds")) => {
            let required = payload.required.unwrap_or_default();
            let balance = payload.balance.unwrap_or_default();
            ServiceFailure::InsufficientBalance {
                required,
                balance,
                missing: payload.missing_amount.unwrap_or_else(|| required.saturating_sub(balance)),
            }
        }
        (Some("subscription_expired"), _) | (_, Some("subscription_expired")) => {
            ServiceFailure::SubscriptionExpired { use_purchase_flow: payload.use_purchase_flow }
        }
        _ => ServiceFailure::Other {
            status,
            message: detail_message.or(payload.message).unwrap_or_default(),
        },
    }
}

fn parse_payload(value: &Value) -> FailurePayload {
    FailurePayload::deserialize(value).unwrap_or_default()
}
