//! dashboard: build chart-ready series and CSV exports for one ticker from
//! raw market data already saved on disk.
//!
//! Usage:
//!   cargo run -p dashboard-cli -- --ticker PENN
//!   cargo run -p dashboard-cli -- --ticker PENN --benchmarks SPY COMP --period quarterly
//!   cargo run -p dashboard-cli -- --list

mod config;
mod dashboard;
mod export;
mod source;

use chrono::Local;
use dashboard_core::{display_name, MarketDataSource, RequestContext};

use crate::config::DashboardConfig;
use crate::dashboard::build_dashboard;
use crate::source::FileSource;

fn print_usage(config: &DashboardConfig) {
    eprintln!("Usage:");
    eprintln!("  dashboard --ticker SYMBOL              Build the dashboard for SYMBOL");
    eprintln!("  dashboard --list                       List screener and watchlist symbols");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --benchmarks A B ...   Benchmark symbols (default: {})", config.benchmarks.join(" "));
    eprintln!("  --start YYYY-MM-DD     First date (default: {})", config.start_date);
    eprintln!("  --end YYYY-MM-DD       End date, exclusive (default: today)");
    eprintln!("  --period KIND          annual or quarterly (default: {})", config.period_kind);
    eprintln!("  --data DIR             Raw data directory (default: {})", config.data_dir.display());
    eprintln!("  --out DIR              Export directory (default: {})", config.out_dir.display());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_cli=info,series_normalizer=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = DashboardConfig::from_env()?.with_args(&args)?;

    let source = FileSource::new(&config.data_dir);
    let quotes = source.screener_quotes().await?;

    let mut symbols: Vec<String> = quotes.iter().map(|q| q.symbol.clone()).collect();
    for symbol in &config.watchlist {
        if !symbols.contains(symbol) {
            symbols.push(symbol.clone());
        }
    }

    if config.list_only {
        for symbol in &symbols {
            println!("{:<8} {}", symbol, display_name(symbol, &quotes));
        }
        return Ok(());
    }

    // Same default as the symbol picker: first screener hit, then the watchlist
    let Some(ticker) = config.ticker.clone().or_else(|| symbols.first().cloned()) else {
        print_usage(&config);
        std::process::exit(1);
    };

    let end = config.end_date.unwrap_or_else(|| Local::now().date_naive());
    let request = RequestContext::new(
        ticker,
        config.benchmarks.clone(),
        config.start_date,
        end,
        config.period_kind,
    )?;

    tracing::info!(
        "dashboard: {} vs [{}], {} to {}, {} statements, data={}",
        request.ticker(),
        request.benchmarks().join(", "),
        request.start(),
        request.end(),
        request.period_kind(),
        config.data_dir.display()
    );

    // build_dashboard logs each warning as it records it
    let dashboard = build_dashboard(&source, &request, &quotes).await?;

    let written = export::export_all(&config.out_dir, &request, &dashboard)?;
    tracing::info!("Done! {} files in {}", written.len(), config.out_dir.display());
    Ok(())
}
