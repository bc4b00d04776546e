//! Integration tests for the HTTP cabinet client against a mock backend.
//!
//! Covers request shape (paths, bearer auth, JSON bodies), success decoding and
//! the mapping of failure payloads to [`ServiceFailure`].

use cabinet_pricing::{
    PricingError,
    addons::{DeviceReduction, ServerEditSession},
    catalog::{ServerId, TariffId},
    error::ServiceFailure,
    flow::{CabinetFlow, Submission, SwitchOutcome},
    money::Kopeks,
    service::{CabinetApi, DeviceReduceRequest, HttpCabinetClient, SwitchRequest},
};
use mockito::{Matcher, Server};
use serde_json::json;

fn client(server: &Server) -> HttpCabinetClient {
    HttpCabinetClient::new(&server.url(), "test-token").expect("mock url should be valid")
}

// ============================================================================
// Catalog reads
// ============================================================================

#[tokio::test]
async fn test_tariffs_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/subscription/tariffs")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "tariffs": [{
                    "id": 3,
                    "name": "Family",
                    "periods": [{ "days": 30, "price_kopeks": 49900 }]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tariffs = client(&server).tariffs().await.unwrap();

    assert_eq!(tariffs.len(), 1);
    assert_eq!(tariffs[0].id, TariffId::new(3));
    assert_eq!(tariffs[0].periods[0].price_kopeks, Kopeks::new(49_900));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_promo_discount_decodes_snapshot() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/promo/discount")
        .with_status(200)
        .with_body(
            json!({
                "is_active": true,
                "discount_percent": 15,
                "expires_at": "2030-05-01T00:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let promo = client(&server).promo_discount().await.unwrap();

    assert_eq!(promo.effective_percent(), Some(15));
    assert!(promo.expires_at.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_subscription_is_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/subscription")
        .with_status(200)
        .with_body(json!({ "subscription": null }).to_string())
        .create_async()
        .await;

    assert!(client(&server).subscription().await.unwrap().is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/subscription/devices/price")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server).device_price().await.unwrap_err();
    assert!(matches!(err, PricingError::Decode(_)));
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_switch_sends_idempotency_key() {
    let mut server = Server::new_async().await;
    let request = SwitchRequest::new(TariffId::new(2));
    let mock = server
        .mock("POST", "/subscription/tariff/switch")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({
            "tariff_id": 2,
            "idempotency_key": request.idempotency_key.to_string(),
        })))
        .with_status(200)
        .with_body(json!({ "success": true, "charged_kopeks": 4000 }).to_string())
        .create_async()
        .await;

    let result = client(&server).switch_tariff(&request).await.unwrap();

    assert!(result.success);
    assert_eq!(result.charged_kopeks, Some(Kopeks::new(4_000)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reduce_devices_sends_new_limit() {
    let mut server = Server::new_async().await;
    let reduction = DeviceReduction::init(5, 1).unwrap();
    let mock = server
        .mock("POST", "/subscription/devices/reduce")
        .match_body(Matcher::PartialJson(json!({ "new_device_limit": 4 })))
        .with_status(200)
        .with_body(json!({ "success": true }).to_string())
        .create_async()
        .await;

    let result = client(&server).reduce_devices(&DeviceReduceRequest::new(&reduction)).await;

    assert!(result.unwrap().success);
    mock.assert_async().await;
}

// ============================================================================
// Failure payloads
// ============================================================================

#[tokio::test]
async fn test_insufficient_balance_is_decoded() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/subscription/tariff/switch")
        .with_status(402)
        .with_body(
            json!({
                "detail": {
                    "code": "insufficient_funds",
                    "required_kopeks": 50000,
                    "balance_kopeks": 12000
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client(&server).switch_tariff(&SwitchRequest::new(TariffId::new(2))).await.unwrap_err();

    assert_eq!(
        err.service_failure(),
        Some(&ServiceFailure::InsufficientBalance {
            required: Kopeks::new(50_000),
            balance: Kopeks::new(12_000),
            missing: Kopeks::new(38_000),
        })
    );
}

#[tokio::test]
async fn test_plain_text_failure_keeps_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/subscription/traffic-packages")
        .with_status(503)
        .with_body("  upstream unavailable \n")
        .create_async()
        .await;

    let err = client(&server).traffic_packages().await.unwrap_err();

    assert_eq!(
        err.service_failure(),
        Some(&ServiceFailure::Other { status: 503, message: "upstream unavailable".to_owned() })
    );
}

// ============================================================================
// Flow over HTTP
// ============================================================================

#[tokio::test]
async fn test_expired_switch_continues_as_purchase() {
    let mut server = Server::new_async().await;
    let _tariffs = server
        .mock("GET", "/subscription/tariffs")
        .with_status(200)
        .with_body(
            json!({
                "tariffs": [{
                    "id": 2,
                    "name": "Pro",
                    "periods": [
                        { "days": 30, "price_kopeks": 30000 },
                        { "days": 90, "price_kopeks": 80000 }
                    ]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _promo = server
        .mock("GET", "/promo/discount")
        .with_status(200)
        .with_body(json!({ "is_active": false }).to_string())
        .create_async()
        .await;
    let _switch = server
        .mock("POST", "/subscription/tariff/switch")
        .with_status(400)
        .with_body(
            json!({
                "detail": { "error_code": "subscription_expired", "use_purchase_flow": true }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let flow = CabinetFlow::new(client(&server));
    let catalog = flow.catalog().await.unwrap();
    let outcome = flow.confirm_switch(&catalog.tariffs[0]).await.unwrap();

    assert_eq!(
        outcome,
        Submission::Completed(SwitchOutcome::PurchaseFlow {
            tariff_id: TariffId::new(2),
            period_days: 30,
        })
    );
}

#[tokio::test]
async fn test_unchanged_servers_make_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/subscription/servers").expect(0).create_async().await;

    let flow = CabinetFlow::new(client(&server));
    let mut session = ServerEditSession::open([ServerId::new("nl-1")]);
    session.toggle(&ServerId::new("de-1"));
    session.toggle(&ServerId::new("de-1"));

    let outcome = flow.update_servers(&session).await.unwrap();

    assert!(matches!(outcome, Submission::Completed(result) if result.success));
    mock.assert_async().await;
}
