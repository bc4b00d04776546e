//! Integration tests for end-to-end pricing scenarios.
//!
//! Each test walks a catalog snapshot through the public calculators the way a
//! cabinet session does: discount display, wizard planning, add-ons and switching.

use cabinet_pricing::{
    PricingError,
    addons::{DeviceReduction, ServerEditSession, device_addon_cost, traffic_topup_price},
    catalog::{DevicePriceQuote, ServerId, Subscription, Tariff, TariffId, TrafficPackage},
    error::ServiceFailure,
    money::{Kopeks, MoneyFormatter},
    pricing::{ExistingDiscount, PromoSnapshot, apply_discount, apply_discount_to_period},
    purchase::{
        PurchaseQuote, PurchaseSelection, PurchaseStep, PurchaseWizard,
        available_servers_for_period, build_purchase_steps,
    },
    switch::{SubscriptionState, SwitchResolution, can_switch, resolve_switch_failure},
};

fn catalog() -> Vec<Tariff> {
    serde_json::from_str(
        r#"[
            {
                "id": 1,
                "name": "Basic",
                "periods": [
                    { "days": 30, "price_kopeks": 1000 }
                ]
            },
            {
                "id": 2,
                "name": "Pro",
                "device_limit": 2,
                "periods": [
                    {
                        "days": 30,
                        "price_kopeks": 30000,
                        "original_price_kopeks": 35000,
                        "extra_devices": { "price_per_device_kopeks": 5000 },
                        "traffic": {
                            "selectable": true,
                            "options": [
                                { "gb": 100, "is_default": true },
                                { "gb": 0, "price_kopeks": 8000 }
                            ]
                        },
                        "servers": [
                            { "uuid": "nl-1", "name": "Netherlands", "price_kopeks": 0 },
                            { "uuid": "de-1", "name": "Germany", "price_kopeks": 0 },
                            { "uuid": "tr-1", "name": "Trial Finland", "price_kopeks": 0 },
                            { "uuid": "us-1", "name": "USA", "is_available": false }
                        ],
                        "devices": { "min": 2, "max": 6 }
                    },
                    { "days": 90, "price_kopeks": 80000 }
                ]
            }
        ]"#,
    )
    .expect("catalog fixture should parse")
}

fn tariff(id: i64) -> Tariff {
    catalog()
        .into_iter()
        .find(|t| t.id == TariffId::new(id))
        .expect("fixture tariff should exist")
}

fn subscription(json: &str) -> Subscription {
    serde_json::from_str(json).expect("subscription fixture should parse")
}

// ============================================================================
// Discount display
// ============================================================================

#[test]
fn test_promo_on_undiscounted_period() {
    let basic = tariff(1);
    let period = basic.first_period().expect("period");

    let price = apply_discount_to_period(period, &PromoSnapshot::active(10));

    assert_eq!(price.price, Kopeks::new(900));
    assert_eq!(price.original, Some(Kopeks::new(1_000)));
    assert_eq!(price.percent, Some(10));
}

#[test]
fn test_promo_combines_with_catalog_discount() {
    let price = apply_discount(
        Kopeks::new(900),
        ExistingDiscount::Original { original_price: Kopeks::new(1_000) },
        &PromoSnapshot::active(20),
    );

    assert_eq!(price.price, Kopeks::new(720));
    assert_eq!(price.original, Some(Kopeks::new(1_000)));
    assert_eq!(price.percent, Some(28));
    assert_eq!(price.savings(), Kopeks::new(280));
}

#[test]
fn test_catalog_discount_shown_without_promo() {
    let pro = tariff(2);
    let period = pro.first_period().expect("period");

    let price = apply_discount_to_period(period, &PromoSnapshot::inactive());

    assert_eq!(price.price, Kopeks::new(30_000));
    assert_eq!(price.original, Some(Kopeks::new(35_000)));
    assert_eq!(price.percent, Some(14));
}

#[test]
fn test_out_of_range_promo_is_ignored() {
    let basic = tariff(1);
    let period = basic.first_period().expect("period");

    let price = apply_discount_to_period(period, &PromoSnapshot::active(150));

    assert_eq!(price.price, Kopeks::new(1_000));
    assert!(!price.has_discount());
}

// ============================================================================
// Purchase wizard
// ============================================================================

#[test]
fn test_fixed_period_has_only_period_and_confirm() {
    let basic = tariff(1);
    let period = basic.first_period().expect("period");

    let servers = available_servers_for_period(period, false);
    assert_eq!(build_purchase_steps(period, servers.len()), vec![
        PurchaseStep::Period,
        PurchaseStep::Confirm
    ]);
}

#[test]
fn test_trial_servers_hidden_for_trial_purchase() {
    let pro = tariff(2);
    let period = pro.first_period().expect("period");

    let regular: Vec<_> = available_servers_for_period(period, false)
        .into_iter()
        .map(|s| s.uuid.as_str().to_owned())
        .collect();
    assert_eq!(regular, ["nl-1", "de-1", "tr-1"]);

    let trial: Vec<_> = available_servers_for_period(period, true)
        .into_iter()
        .map(|s| s.uuid.as_str().to_owned())
        .collect();
    assert_eq!(trial, ["nl-1", "de-1"]);
}

#[test]
fn test_wizard_walks_every_step() {
    let pro = tariff(2);
    let period = pro.first_period().expect("period");
    let servers = available_servers_for_period(period, false);

    let mut wizard = PurchaseWizard::new(period, servers.len());
    let mut visited = vec![wizard.current()];
    while !wizard.is_last() {
        wizard.next();
        visited.push(wizard.current());
    }

    assert_eq!(visited, vec![
        PurchaseStep::Period,
        PurchaseStep::Traffic,
        PurchaseStep::Servers,
        PurchaseStep::Devices,
        PurchaseStep::Confirm,
    ]);
}

#[test]
fn test_purchase_quote_with_extras_and_promo() {
    let pro = tariff(2);
    let selection = PurchaseSelection {
        traffic_gb: Some(0),
        servers: vec![ServerId::new("nl-1"), ServerId::new("de-1")],
        devices: Some(3),
    };

    let period = pro.period(30).expect("period");

    let quote = PurchaseQuote::build(&pro, period, &selection, &PromoSnapshot::active(10))
        .expect("selection should be valid");

    assert_eq!(quote.extra_devices, 1);
    assert_eq!(quote.subtotal, Kopeks::new(43_000));
    assert_eq!(quote.amount_due(), Kopeks::new(38_700));
    assert_eq!(MoneyFormatter::default().format(quote.amount_due()), "387 ₽");
}

#[test]
fn test_purchase_quote_rejects_unavailable_server() {
    let pro = tariff(2);
    let selection =
        PurchaseSelection { servers: vec![ServerId::new("us-1")], ..PurchaseSelection::default() };

    let period = pro.period(30).expect("period");

    let result = PurchaseQuote::build(&pro, period, &selection, &PromoSnapshot::inactive());
    assert!(matches!(result, Err(PricingError::InvalidSelection(_))));
}

// ============================================================================
// Add-ons
// ============================================================================

#[test]
fn test_traffic_topup_with_promo() {
    let package: TrafficPackage = serde_json::from_str(
        r#"{ "gb": 50, "price_kopeks": 9000, "base_price_kopeks": 10000, "discount_percent": 10 }"#,
    )
    .expect("package");

    let price = traffic_topup_price(&package, &PromoSnapshot::active(20));
    assert_eq!(price.price, Kopeks::new(7_200));
    assert_eq!(price.original, Some(Kopeks::new(10_000)));
    assert_eq!(price.percent, Some(28));
}

#[test]
fn test_device_reduction_defaults_to_one_fewer() {
    let mut reduction = DeviceReduction::init(5, 1).expect("reduction available");
    assert_eq!(reduction.target(), 4);

    assert_eq!(reduction.set_target(0), 1);
    assert_eq!(reduction.set_target(9), 4);
    assert_eq!(reduction.devices_removed(), 1);

    assert!(DeviceReduction::init(1, 1).is_none());
}

#[test]
fn test_device_addon_respects_limit() {
    let quote = DevicePriceQuote {
        price_per_device_kopeks: Kopeks::new(5_000),
        current_device_limit: 3,
        max_device_limit: Some(5),
        min_device_limit: 1,
        days_left: 20,
    };

    let cost = device_addon_cost(&quote, 2).expect("two devices fit");
    assert_eq!(cost.new_limit, 5);
    assert_eq!(cost.price, Kopeks::new(10_000));

    assert!(device_addon_cost(&quote, 3).is_err());
}

#[test]
fn test_server_edit_prices_only_additions() {
    let pro = tariff(2);
    let catalog: Vec<_> = pro.first_period().expect("period").servers.clone();

    let mut session = ServerEditSession::open([ServerId::new("nl-1")]);
    session.toggle(&ServerId::new("nl-1"));
    session.toggle(&ServerId::new("de-1"));

    let diff = session.diff();
    assert_eq!(diff.added, vec![ServerId::new("de-1")]);
    assert_eq!(diff.removed, vec![ServerId::new("nl-1")]);
    assert_eq!(session.cost(&catalog).expect("known servers"), Kopeks::ZERO);
}

// ============================================================================
// Tariff switching
// ============================================================================

#[test]
fn test_expired_subscription_falls_back_to_purchase() {
    let expired = subscription(
        r#"{ "tariff_id": 1, "end_date": "2020-01-01T00:00:00Z", "is_active": false, "is_expired": true }"#,
    );
    let target = tariff(2);

    assert_eq!(SubscriptionState::classify(Some(&expired)), SubscriptionState::Expired);
    assert!(!can_switch(Some(&expired), target.id));

    let error =
        PricingError::Service(ServiceFailure::SubscriptionExpired { use_purchase_flow: true });
    assert_eq!(resolve_switch_failure(&error, &target), SwitchResolution::PurchaseFlow {
        tariff_id: TariffId::new(2),
        period_days: 30,
    });
}

#[test]
fn test_active_subscription_can_switch_to_other_tariff() {
    let active = subscription(
        r#"{ "tariff_id": 1, "end_date": "2099-01-01T00:00:00Z", "is_active": true }"#,
    );

    assert!(can_switch(Some(&active), TariffId::new(2)));
    assert!(!can_switch(Some(&active), TariffId::new(1)));
    assert!(!can_switch(None, TariffId::new(2)));
}

#[test]
fn test_insufficient_balance_is_reported_not_recovered() {
    let target = tariff(2);
    let error = PricingError::Service(ServiceFailure::InsufficientBalance {
        required: Kopeks::new(30_000),
        balance: Kopeks::new(10_000),
        missing: Kopeks::new(20_000),
    });

    assert!(matches!(
        resolve_switch_failure(&error, &target),
        SwitchResolution::Failed { message } if message == "insufficient balance, 200 ₽ missing"
    ));
}
