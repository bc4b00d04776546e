//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "cabinet-quote")]
#[command(version)]
#[command(about = "Price cabinet tariff catalogs offline", long_about = None)]
pub struct Cli {
    /// TOML configuration with `[currency]` and `[servers]` sections
    #[arg(long, global = true, env = "CABINET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every tariff period with its display price
    Prices(PricesArgs),

    /// Show the purchase wizard steps for a period
    Steps(PeriodArgs),

    /// Price a full purchase selection
    Quote(QuoteArgs),

    /// Price a custom period length or traffic amount
    Custom(CustomArgs),
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog snapshot: a JSON array of tariffs or `{"tariffs": [...]}`
    #[arg(short, long)]
    pub catalog: PathBuf,
}

#[derive(Args, Debug)]
pub struct PromoArgs {
    /// Active promo discount percent
    #[arg(short, long)]
    pub promo: Option<i32>,
}

#[derive(Args, Debug)]
pub struct PricesArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[command(flatten)]
    pub promo: PromoArgs,
}

#[derive(Args, Debug)]
pub struct PeriodArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Tariff id
    #[arg(short, long)]
    pub tariff: i64,

    /// Period length in days
    #[arg(short = 'd', long)]
    pub period: u32,

    /// Quote for a trial subscription (hides trial-only servers)
    #[arg(long, default_value = "false")]
    pub trial: bool,
}

#[derive(Args, Debug)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    #[command(flatten)]
    pub promo: PromoArgs,

    /// Traffic option in GB (0 for unlimited)
    #[arg(long)]
    pub traffic: Option<u64>,

    /// Server uuid to include; repeat for several
    #[arg(short, long = "server")]
    pub servers: Vec<String>,

    /// Device count
    #[arg(long)]
    pub devices: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Tariff id
    #[arg(short, long)]
    pub tariff: i64,

    /// Custom period length in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Custom traffic amount in GB
    #[arg(long)]
    pub traffic_gb: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with formatted amounts
    Text,
    /// JSON with raw kopek amounts
    Json,
}
