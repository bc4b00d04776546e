//! Subcommand implementations.
//!
//! Each command renders a report string so `main` only decides where it goes.

use std::{fmt::Write as _, path::Path};

use anyhow::{Context as _, Result, bail};
use cabinet_pricing::{
    catalog::{ServerId, Tariff, TariffId, TariffPeriod, custom_period_price, custom_traffic_price},
    config::CabinetConfig,
    money::MoneyFormatter,
    pricing::{DiscountedPrice, PromoSnapshot, apply_discount_to_period},
    purchase::{
        PurchaseQuote, PurchaseSelection, PurchaseStep, available_servers_with_marker,
        build_purchase_steps,
    },
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::cli::{CustomArgs, OutputFormat, PeriodArgs, PricesArgs, PromoArgs, QuoteArgs};

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    formatter: MoneyFormatter,
    trial_marker: String,
    output: OutputFormat,
}

impl Context {
    /// Builds the context from an optional configuration file.
    pub fn load(config: Option<&Path>, output: OutputFormat) -> Result<Self> {
        let config = match config {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                CabinetConfig::from_file(path)?
            }
            None => CabinetConfig::default(),
        };
        Ok(Self::new(&config, output))
    }

    fn new(config: &CabinetConfig, output: OutputFormat) -> Self {
        Self {
            formatter: config.formatter(),
            trial_marker: config.servers.trial_marker.clone(),
            output,
        }
    }

    fn price(&self, price: &DiscountedPrice) -> String {
        let amount = self.formatter.format(price.price);
        match (price.original, price.percent) {
            (Some(original), Some(percent)) => {
                format!("{amount} (was {}, -{percent}%)", self.formatter.format(original))
            }
            (Some(original), None) => format!("{amount} (was {})", self.formatter.format(original)),
            _ => amount,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Envelope { tariffs: Vec<Tariff> },
    List(Vec<Tariff>),
}

/// Parses a catalog snapshot in either accepted shape.
pub fn parse_catalog(document: &str) -> Result<Vec<Tariff>> {
    let tariffs = match serde_json::from_str(document).context("invalid catalog JSON")? {
        CatalogDocument::Envelope { tariffs } | CatalogDocument::List(tariffs) => tariffs,
    };
    Ok(tariffs)
}

fn load_catalog(path: &Path) -> Result<Vec<Tariff>> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let tariffs = parse_catalog(&document)?;
    info!(path = %path.display(), tariffs = tariffs.len(), "loaded catalog");
    Ok(tariffs)
}

fn find_tariff(tariffs: &[Tariff], id: i64) -> Result<&Tariff> {
    let id = TariffId::new(id);
    tariffs.iter().find(|t| t.id == id).with_context(|| format!("tariff {id} not in catalog"))
}

fn find_period(tariff: &Tariff, days: u32) -> Result<&TariffPeriod> {
    tariff.period(days).with_context(|| format!("tariff {} has no {days}-day period", tariff.id))
}

fn promo(args: &PromoArgs) -> PromoSnapshot {
    args.promo.map_or_else(PromoSnapshot::inactive, PromoSnapshot::active)
}

fn to_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize report")
}

// ============================================================================
// prices
// ============================================================================

/// Lists every period of every tariff with its display price.
pub fn prices(ctx: &Context, args: &PricesArgs) -> Result<String> {
    let tariffs = load_catalog(&args.catalog.catalog)?;
    render_prices(ctx, &tariffs, &promo(&args.promo))
}

fn render_prices(ctx: &Context, tariffs: &[Tariff], promo: &PromoSnapshot) -> Result<String> {
    match ctx.output {
        OutputFormat::Json => {
            let rows: Vec<_> = tariffs
                .iter()
                .flat_map(|tariff| {
                    tariff.periods.iter().map(move |period| {
                        json!({
                            "tariff_id": tariff.id,
                            "tariff_name": tariff.name,
                            "period_days": period.days,
                            "price": apply_discount_to_period(period, promo),
                        })
                    })
                })
                .collect();
            to_json(&json!(rows))
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for tariff in tariffs {
                writeln!(out, "{} [{}]", tariff.name, tariff.id)?;
                for period in &tariff.periods {
                    let price = apply_discount_to_period(period, promo);
                    writeln!(out, "  {:>4} days  {}", period.days, ctx.price(&price))?;
                }
            }
            Ok(out)
        }
    }
}

// ============================================================================
// steps
// ============================================================================

/// Shows the wizard steps and selectable servers for a period.
pub fn steps(ctx: &Context, args: &PeriodArgs) -> Result<String> {
    let tariffs = load_catalog(&args.catalog.catalog)?;
    render_steps(ctx, &tariffs, args)
}

fn render_steps(ctx: &Context, tariffs: &[Tariff], args: &PeriodArgs) -> Result<String> {
    let tariff = find_tariff(tariffs, args.tariff)?;
    let period = find_period(tariff, args.period)?;
    let servers = available_servers_with_marker(period, args.trial, &ctx.trial_marker);
    let steps = build_purchase_steps(period, servers.len());

    match ctx.output {
        OutputFormat::Json => to_json(&json!({
            "steps": steps,
            "servers": servers.iter().map(|s| &s.uuid).collect::<Vec<_>>(),
        })),
        OutputFormat::Text => {
            let names: Vec<_> = steps.iter().copied().map(step_name).collect();
            let mut out = format!("steps: {}\n", names.join(" -> "));
            for server in servers {
                writeln!(out, "  server {} ({})", server.name, server.uuid)?;
            }
            Ok(out)
        }
    }
}

const fn step_name(step: PurchaseStep) -> &'static str {
    match step {
        PurchaseStep::Period => "period",
        PurchaseStep::Traffic => "traffic",
        PurchaseStep::Servers => "servers",
        PurchaseStep::Devices => "devices",
        PurchaseStep::Confirm => "confirm",
    }
}

// ============================================================================
// quote
// ============================================================================

/// Prices a full purchase selection.
pub fn quote(ctx: &Context, args: &QuoteArgs) -> Result<String> {
    let tariffs = load_catalog(&args.period.catalog.catalog)?;
    render_quote(ctx, &tariffs, args)
}

fn render_quote(ctx: &Context, tariffs: &[Tariff], args: &QuoteArgs) -> Result<String> {
    let tariff = find_tariff(tariffs, args.period.tariff)?;
    let period = find_period(tariff, args.period.period)?;

    let available = available_servers_with_marker(period, args.period.trial, &ctx.trial_marker);
    if let Some(hidden) =
        args.servers.iter().find(|id| !available.iter().any(|s| s.uuid.as_str() == id.as_str()))
    {
        bail!("server {hidden} is not selectable for this subscription");
    }

    let selection = PurchaseSelection {
        traffic_gb: args.traffic,
        servers: args.servers.iter().map(ServerId::new).collect(),
        devices: args.devices,
    };
    let quote = PurchaseQuote::build(tariff, period, &selection, &promo(&args.promo))?;
    debug!(subtotal = %quote.subtotal, due = %quote.amount_due(), "priced selection");

    match ctx.output {
        OutputFormat::Json => to_json(&serde_json::to_value(&quote)?),
        OutputFormat::Text => {
            let f = &ctx.formatter;
            let mut out = String::new();
            writeln!(out, "{} / {} days", tariff.name, quote.period_days)?;
            writeln!(out, "  period    {}", f.format(quote.period_price))?;
            if let Some(gb) = quote.traffic_gb {
                let label = if gb == 0 { "unlimited".to_owned() } else { format!("{gb} GB") };
                writeln!(out, "  traffic   {} ({label})", f.format(quote.traffic_price))?;
            }
            if !quote.servers.is_empty() {
                writeln!(
                    out,
                    "  servers   {} ({})",
                    f.format(quote.servers_price),
                    quote.servers.len()
                )?;
            }
            writeln!(
                out,
                "  devices   {} ({} total, {} extra)",
                f.format(quote.devices_price),
                quote.devices,
                quote.extra_devices
            )?;
            writeln!(out, "  total     {}", ctx.price(&quote.total))?;
            Ok(out)
        }
    }
}

// ============================================================================
// custom
// ============================================================================

/// Prices a custom period length and/or traffic amount.
pub fn custom(ctx: &Context, args: &CustomArgs) -> Result<String> {
    let tariffs = load_catalog(&args.catalog.catalog)?;
    render_custom(ctx, &tariffs, args)
}

fn render_custom(ctx: &Context, tariffs: &[Tariff], args: &CustomArgs) -> Result<String> {
    if args.days.is_none() && args.traffic_gb.is_none() {
        bail!("pass --days and/or --traffic-gb");
    }
    let tariff = find_tariff(tariffs, args.tariff)?;

    let period = args
        .days
        .map(|days| {
            custom_period_price(tariff, days)
                .with_context(|| format!("tariff {} has no custom periods", tariff.id))
        })
        .transpose()?;
    let traffic = args
        .traffic_gb
        .map(|gb| {
            custom_traffic_price(tariff, gb)
                .with_context(|| format!("tariff {} has no custom traffic", tariff.id))
        })
        .transpose()?;

    match ctx.output {
        OutputFormat::Json => to_json(&json!({
            "period": period.map(|q| json!({ "days": q.days, "price": q.price })),
            "traffic": traffic.map(|q| json!({ "gb": q.gb, "price": q.price })),
        })),
        OutputFormat::Text => {
            let mut out = String::new();
            if let Some(q) = period {
                writeln!(out, "{} days: {}", q.days, ctx.formatter.format(q.price))?;
            }
            if let Some(q) = traffic {
                writeln!(out, "{} GB: {}", q.gb, ctx.formatter.format(q.price))?;
            }
            Ok(out)
        }
    }
}
