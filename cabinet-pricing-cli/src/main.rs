//! Cabinet Quote - price cabinet tariff catalogs offline.
//!
//! Usage:
//!   cabinet-quote prices --catalog tariffs.json --promo 15
//!   cabinet-quote steps --catalog tariffs.json --tariff 2 --period 30 --trial
//!   cabinet-quote quote --catalog tariffs.json --tariff 2 --period 30 -s nl-1 --devices 3
//!   cabinet-quote custom --catalog tariffs.json --tariff 4 --days 45 --output json

#![allow(clippy::multiple_crate_versions, reason = "transitive dependencies from reqwest")]

mod cli;
mod commands;
mod observability;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use observability::{LogFormat, init_observability};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_observability(LogFormat::from_env());

    let ctx = Context::load(cli.config.as_deref(), cli.output)?;

    let report = match &cli.command {
        Commands::Prices(args) => commands::prices(&ctx, args)?,
        Commands::Steps(args) => commands::steps(&ctx, args)?,
        Commands::Quote(args) => commands::quote(&ctx, args)?,
        Commands::Custom(args) => commands::custom(&ctx, args)?,
    };

    print!("{report}");
    if !report.ends_with('\n') {
        println!();
    }

    Ok(())
}
