use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{EpsReport, FactSheet, NormalizeError, PeriodKind, PriceSeries, RawStatement, ScreenerQuote};

/// Wide (one column per date, one row per category) table that can be
/// flattened into chart rows
pub trait WideTable {
    /// Row labels, used as the chart's colour channel
    fn categories(&self) -> Vec<String>;

    /// Column labels, in display order
    fn dates(&self) -> Vec<String>;

    /// Cell at (`category`, `date`) index, `None` when missing
    fn cell(&self, category: usize, date: usize) -> Option<f64>;
}

/// Supplier of raw, already-fetched market and fundamental data
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily closes with `start <= date < end`
    async fn closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, NormalizeError>;

    async fn income_statement(
        &self,
        symbol: &str,
        period_kind: PeriodKind,
    ) -> Result<RawStatement, NormalizeError>;

    async fn quarterly_eps(&self, symbol: &str) -> Result<Vec<EpsReport>, NormalizeError>;

    async fn fact_sheet(&self, symbol: &str) -> Result<FactSheet, NormalizeError>;

    async fn screener_quotes(&self) -> Result<Vec<ScreenerQuote>, NormalizeError>;
}
