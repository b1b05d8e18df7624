//! QuickFx CLI
//!
//! Runs one conversion query against the live rate API, the same way a
//! launcher host would drive the engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use quickfx_common::NumberFormat;
use quickfx_engine::{
    ApiProfile, Converter, ConverterConfig, ConversionDirection, HttpRateProvider, OutputStyle,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// QuickFx currency converter CLI
#[derive(Parser, Debug)]
#[command(name = "quickfx")]
#[command(about = "Convert real and crypto currencies from a search query")]
struct Args {
    /// Query, e.g. "100 usd to eur", "42 eur", "(5+3)*2"
    query: Vec<String>,

    /// Local currency code
    #[arg(short, long, default_value = "usd")]
    local: String,

    /// Target currencies for fan-out (repeatable)
    #[arg(short, long = "target", default_value = "eur")]
    targets: Vec<String>,

    /// Put target→local conversions before local→target
    #[arg(long)]
    target_first: bool,

    /// Show expanded output ("100.00 USD = 92.00 EUR") as the primary line
    #[arg(long)]
    expanded: bool,

    /// Display precision (fraction digits)
    #[arg(long, default_value = "2")]
    precision: u32,

    /// Use comma as the decimal separator (1.234,56 style)
    #[arg(long)]
    comma_decimal: bool,

    /// Rate cache TTL in hours (clamped to 0.5–24)
    #[arg(long, default_value = "3.0")]
    ttl: f64,

    /// Rate API: default, exchangerate-api, or currencyapi
    #[arg(long, default_value = "default")]
    api: String,

    /// API key, for rate APIs that need one
    #[arg(long, default_value = "")]
    api_key: String,

    /// Rate snapshot date token
    #[arg(long, default_value = "latest")]
    date: String,

    /// Path to an alias file (JSON object of alias → code)
    #[arg(long)]
    alias_file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Treat the query as an ambient (global) search
    #[arg(long)]
    global: bool,

    /// Show warning results even for ambient searches
    #[arg(long)]
    show_warnings_in_global: bool,
}

fn profile_from_name(name: &str) -> anyhow::Result<ApiProfile> {
    match name {
        "default" => Ok(ApiProfile::Default),
        "exchangerate-api" => Ok(ApiProfile::ExchangeRateApi),
        "currencyapi" => Ok(ApiProfile::CurrencyApi),
        other => bail!("unknown rate API '{other}'"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        bail!("no query given; try: quickfx 100 usd to eur");
    }

    let config = ConverterConfig {
        local_currency: args.local,
        target_currencies: args.targets,
        direction: if args.target_first {
            ConversionDirection::TargetFirst
        } else {
            ConversionDirection::LocalFirst
        },
        output_style: if args.expanded {
            OutputStyle::Expanded
        } else {
            OutputStyle::Compact
        },
        precision: args.precision,
        number_format: if args.comma_decimal {
            NumberFormat::comma_decimal()
        } else {
            NumberFormat::dot_decimal()
        },
        cache_ttl_hours: args.ttl,
        profile: profile_from_name(&args.api)?,
        conversion_date: args.date,
        api_key: args.api_key,
        show_warnings_in_global: args.show_warnings_in_global,
        alias_path: args.alias_file,
        request_timeout: Duration::from_secs(args.timeout),
    };

    let provider = Arc::new(
        HttpRateProvider::new(
            config.profile.clone(),
            config.conversion_date.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
        .context("failed to build HTTP rate provider")?,
    );

    let converter = Converter::new(config, provider).context("invalid configuration")?;

    debug!(query = %query, "running search");
    let results = converter.search(&query, args.global).await;

    if results.is_empty() {
        println!("(no results)");
        return Ok(());
    }

    for result in &results {
        println!("{}", result.title);
        println!("    {}", result.subtitle);
        if let Some(link) = &result.link {
            println!("    {}", link);
        }
    }

    Ok(())
}
