//! Cabinet Pricing: Subscription Pricing and Purchase-Flow Engine
//!
//! A Rust library that computes what a VPN/proxy subscriber pays when buying,
//! extending, switching or adding capacity to a subscription, and orchestrates
//! forwarding the final selection to the cabinet backend.
//!
//! # What does it do?
//!
//! The cabinet backend owns the catalog, balances and the ledger. This crate sits
//! in front of it and provides:
//!
//! - **Discount stacking**: promo discounts on top of catalog discounts, shown as
//!   one combined saving instead of two stacked badges
//! - **Purchase wizard planning**: which steps (traffic, servers, devices) a
//!   period actually needs
//! - **Add-on pricing**: traffic top-ups, device limit changes and server edits
//! - **Tariff switching**: eligibility, previews bound to their target tariff and
//!   the expired-subscription fallback into a fresh purchase
//! - **Submission safety**: at most one submission in flight per operation, each
//!   with its own idempotency key
//!
//! The engine never executes a purchase or mutates a balance.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 CabinetFlow (flow)                   │
//! │   submission guard · preview slot · fallback         │
//! └────────┬──────────────────────────────┬──────────────┘
//!          │ pure calculators             │ CabinetApi
//! ┌────────▼───────────────────┐   ┌──────▼──────────────┐
//! │ pricing · purchase ·       │   │ HttpCabinetClient   │
//! │ addons · switch            │   │ (reqwest + bearer)  │
//! └────────┬───────────────────┘   └──────┬──────────────┘
//!          │                              │ HTTPS
//! ┌────────▼───────────┐          ┌───────▼─────────────┐
//! │ catalog · money    │          │  Cabinet backend    │
//! └────────────────────┘          └─────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Price a Period with a Promo
//!
//! ```rust
//! use cabinet_pricing::{
//!     catalog::Tariff,
//!     money::MoneyFormatter,
//!     pricing::{PromoSnapshot, apply_discount_to_period},
//! };
//!
//! let tariff: Tariff = serde_json::from_str(r#"{
//!     "id": 1,
//!     "name": "Standard",
//!     "periods": [{ "days": 30, "price_kopeks": 90000, "original_price_kopeks": 100000 }]
//! }"#)?;
//!
//! let period = tariff.first_period().expect("tariff has a period");
//! let price = apply_discount_to_period(period, &PromoSnapshot::active(20));
//!
//! let formatter = MoneyFormatter::default();
//! assert_eq!(formatter.format(price.price), "720 ₽");
//! assert_eq!(price.original.map(|p| formatter.format(p)).as_deref(), Some("1 000 ₽"));
//! assert_eq!(price.percent, Some(28));
//! # Ok::<(), serde_json::Error>(())
//! ```
//!
//! ## 2. Plan the Purchase Wizard
//!
//! ```rust
//! use cabinet_pricing::{
//!     catalog::TariffPeriod,
//!     purchase::{PurchaseStep, available_servers_for_period, build_purchase_steps},
//! };
//!
//! let period: TariffPeriod = serde_json::from_str(r#"{
//!     "days": 30,
//!     "price_kopeks": 19900,
//!     "traffic": { "selectable": true, "options": [{ "gb": 100 }, { "gb": 500, "price_kopeks": 9900 }] },
//!     "servers": [{ "uuid": "nl", "name": "Netherlands" }, { "uuid": "tr", "name": "Trial pool" }],
//!     "devices": { "min": 1, "max": 5 }
//! }"#)?;
//!
//! let servers = available_servers_for_period(&period, true);
//! assert_eq!(build_purchase_steps(&period, servers.len()), vec![
//!     PurchaseStep::Period,
//!     PurchaseStep::Traffic,
//!     PurchaseStep::Devices,
//!     PurchaseStep::Confirm,
//! ]);
//! # Ok::<(), serde_json::Error>(())
//! ```
//!
//! ## 3. Submit Against the Backend
//!
//! ```rust,no_run
//! use cabinet_pricing::{
//!     flow::{CabinetFlow, Submission, SwitchOutcome},
//!     service::HttpCabinetClient,
//! };
//!
//! # async fn example() -> cabinet_pricing::error::Result<()> {
//! let client = HttpCabinetClient::new("https://cabinet.example.com/api", "token")?;
//! let flow = CabinetFlow::new(client);
//!
//! let catalog = flow.catalog().await?;
//! let target = &catalog.tariffs[0];
//!
//! if let Some(preview) = flow.preview_switch(target.id).await? {
//!     println!("switch costs {} kopeks", preview.upgrade_cost_kopeks);
//! }
//!
//! match flow.confirm_switch(target).await? {
//!     Submission::Completed(SwitchOutcome::Switched(_)) => println!("switched"),
//!     Submission::Completed(SwitchOutcome::PurchaseFlow { tariff_id, period_days }) => {
//!         println!("subscription expired, buy {period_days} days of tariff {tariff_id}");
//!     }
//!     Submission::Ignored => println!("a switch is already in flight"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`money`]: integer kopek amounts and locale-injected formatting
//! - [`catalog`]: tariffs, periods, packages and subscriptions from the backend
//! - [`pricing`]: promo discount stacking and balance checks
//! - [`purchase`]: wizard steps, server availability and purchase totals
//! - [`addons`]: traffic, device and server add-ons
//! - [`switch`]: switch eligibility, previews and failure recovery
//! - [`service`]: the [`CabinetApi`](service::CabinetApi) seam and its HTTP client
//! - [`flow`]: submission orchestration
//! - [`config`]: TOML configuration
//! - [`error`]: error types with recovery guidance
//!
//! # Money and Rounding
//!
//! Amounts are integer kopeks ([`Kopeks`](money::Kopeks)). Percentages are applied
//! with exact decimal arithmetic and rounded half away from zero, so a price is
//! never computed in floating point.
//!
//! # Error Handling
//!
//! Calculators are total. Fallible operations return
//! [`Result<T, PricingError>`](error::Result):
//!
//! ```rust
//! use cabinet_pricing::{
//!     PricingError,
//!     catalog::DevicePriceQuote,
//!     addons::device_addon_cost,
//!     money::Kopeks,
//! };
//!
//! let quote = DevicePriceQuote {
//!     price_per_device_kopeks: Kopeks::new(5_000),
//!     current_device_limit: 4,
//!     max_device_limit: Some(5),
//!     min_device_limit: 1,
//!     days_left: 12,
//! };
//!
//! match device_addon_cost(&quote, 3) {
//!     Ok(cost) => println!("pay {}", cost.price),
//!     Err(PricingError::InvalidSelection(msg)) => eprintln!("cannot add: {msg}"),
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions, reason = "transitive dependencies from reqwest")]

pub mod addons;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod money;
pub mod pricing;
pub mod purchase;
pub mod service;
pub mod switch;

pub use error::{PricingError, Result};
pub use money::Kopeks;
