//! File-backed market data: one directory per symbol holding the raw tables
//! exported from the data provider.
//!
//! ```text
//! <root>/<SYMBOL>/prices.csv            date,close
//! <root>/<SYMBOL>/income_annual.csv     item,<period end>,...
//! <root>/<SYMBOL>/income_quarterly.csv  item,<period end>,...
//! <root>/<SYMBOL>/earnings.csv          fiscal_date_ending,reported_eps
//! <root>/<SYMBOL>/info.json             provider info blob
//! <root>/screener.json                  {"quotes": [...]}
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use dashboard_core::{
    parse_reported, EpsReport, FactSheet, MarketDataSource, NormalizeError, PeriodKind,
    PriceSeries, RawStatement, ScreenerQuote,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn symbol_file(&self, symbol: &str, name: &str) -> PathBuf {
        self.root.join(symbol.to_uppercase()).join(name)
    }
}

#[derive(Debug, Deserialize)]
struct ScreenerResponse {
    #[serde(default)]
    quotes: Vec<ScreenerQuote>,
}

async fn read_required(path: &Path) -> Result<String, NormalizeError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NormalizeError::InvalidData(format!("{}: {}", path.display(), e)))
}

async fn read_optional(path: &Path) -> Result<Option<String>, NormalizeError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{} not found, skipping", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn csv_error(what: &str, e: csv::Error) -> NormalizeError {
    NormalizeError::InvalidData(format!("{}: {}", what, e))
}

/// Accepts plain dates and provider timestamps such as `2024-01-10 00:00:00-05:00`
fn parse_date(raw: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = raw.trim();
    trimmed
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| NormalizeError::InvalidData(format!("invalid date '{}'", trimmed)))
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

fn column_index(headers: &csv::StringRecord, name: &str, fallback: usize) -> usize {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .unwrap_or(fallback)
}

/// Daily closes; rows without a usable close are skipped
pub fn parse_prices(symbol: &str, text: &str) -> Result<PriceSeries, NormalizeError> {
    let mut reader = csv_reader(text);
    let headers = reader.headers().map_err(|e| csv_error(symbol, e))?.clone();
    let close_idx = column_index(&headers, "close", 1);

    let mut series = PriceSeries::new(symbol);
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(symbol, e))?;
        let date = parse_date(record.get(0).unwrap_or(""))?;
        match record.get(close_idx).and_then(parse_reported) {
            Some(close) => series.insert(date, close),
            None => tracing::debug!("{}: no close on {}", symbol, date),
        }
    }
    Ok(series)
}

/// Wide statement: first column is the provider row name, one column per period
pub fn parse_statement(text: &str) -> Result<RawStatement, NormalizeError> {
    let mut reader = csv_reader(text);
    let headers = reader
        .headers()
        .map_err(|e| csv_error("income statement", e))?
        .clone();
    let periods = headers
        .iter()
        .skip(1)
        .map(parse_date)
        .collect::<Result<Vec<_>, _>>()?;

    let mut raw = RawStatement::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error("income statement", e))?;
        let name = record.get(0).unwrap_or("").to_string();
        if name.is_empty() {
            continue;
        }
        let cells: BTreeMap<NaiveDate, Option<f64>> = periods
            .iter()
            .enumerate()
            .map(|(i, period)| (*period, record.get(i + 1).and_then(parse_reported)))
            .collect();
        raw.insert(name, cells);
    }
    Ok(raw)
}

/// Quarterly EPS history; unparsable EPS cells count as not reported
pub fn parse_earnings(text: &str) -> Result<Vec<EpsReport>, NormalizeError> {
    let mut reader = csv_reader(text);
    let headers = reader.headers().map_err(|e| csv_error("earnings", e))?.clone();
    let date_idx = column_index(&headers, "fiscal_date_ending", 0);
    let eps_idx = column_index(&headers, "reported_eps", 1);

    let mut reports = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error("earnings", e))?;
        reports.push(EpsReport {
            fiscal_date_ending: parse_date(record.get(date_idx).unwrap_or(""))?,
            reported_eps: record.get(eps_idx).and_then(parse_reported),
        });
    }
    Ok(reports)
}

#[async_trait]
impl MarketDataSource for FileSource {
    async fn closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, NormalizeError> {
        let text = read_required(&self.symbol_file(symbol, "prices.csv")).await?;
        let series = parse_prices(&symbol.to_uppercase(), &text)?.between(start, end);
        tracing::debug!("{}: {} closes between {} and {}", symbol, series.len(), start, end);
        Ok(series)
    }

    async fn income_statement(
        &self,
        symbol: &str,
        period_kind: PeriodKind,
    ) -> Result<RawStatement, NormalizeError> {
        let name = format!("income_{}.csv", period_kind);
        let text = read_required(&self.symbol_file(symbol, &name)).await?;
        parse_statement(&text)
    }

    async fn quarterly_eps(&self, symbol: &str) -> Result<Vec<EpsReport>, NormalizeError> {
        match read_optional(&self.symbol_file(symbol, "earnings.csv")).await? {
            Some(text) => parse_earnings(&text),
            None => Ok(Vec::new()),
        }
    }

    async fn fact_sheet(&self, symbol: &str) -> Result<FactSheet, NormalizeError> {
        match read_optional(&self.symbol_file(symbol, "info.json")).await? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| NormalizeError::InvalidData(format!("{} info: {}", symbol, e))),
            None => Ok(FactSheet::default()),
        }
    }

    async fn screener_quotes(&self) -> Result<Vec<ScreenerQuote>, NormalizeError> {
        match read_optional(&self.root.join("screener.json")).await? {
            Some(text) => serde_json::from_str::<ScreenerResponse>(&text)
                .map(|r| r.quotes)
                .map_err(|e| NormalizeError::InvalidData(format!("screener: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}
