use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{NormalizeError, WideTable};

/// Reporting cadence of an income statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Quarterly,
    Annual,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Quarterly => "quarterly",
            PeriodKind::Annual => "annual",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quarterly" | "quarter" | "q" => Ok(PeriodKind::Quarterly),
            "annual" | "yearly" | "a" => Ok(PeriodKind::Annual),
            other => Err(NormalizeError::InvalidData(format!(
                "unknown period kind '{}'",
                other
            ))),
        }
    }
}

/// Canonical income statement line items kept for charting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineItem {
    TotalRevenue,
    CostOfRevenue,
    GrossProfit,
    OperatingExpense,
    OperatingIncome,
    Ebitda,
}

impl LineItem {
    /// Display order of the statement rows
    pub const ALL: [LineItem; 6] = [
        LineItem::TotalRevenue,
        LineItem::CostOfRevenue,
        LineItem::GrossProfit,
        LineItem::OperatingExpense,
        LineItem::OperatingIncome,
        LineItem::Ebitda,
    ];

    /// Canonical display name
    pub fn label(&self) -> &'static str {
        match self {
            LineItem::TotalRevenue => "Total Revenue",
            LineItem::CostOfRevenue => "Cost of Revenue",
            LineItem::GrossProfit => "Gross Profit",
            LineItem::OperatingExpense => "Operating Expense",
            LineItem::OperatingIncome => "Operating Income",
            LineItem::Ebitda => "EBITDA",
        }
    }

    /// Outflows are stored negative so that rows sum towards profit
    pub fn is_outflow(&self) -> bool {
        matches!(self, LineItem::CostOfRevenue | LineItem::OperatingExpense)
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Close prices for one symbol, keyed by trading date.
///
/// Dates are unique and iterate in ascending order; inserting a date that is
/// already present replaces its close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    closes: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            closes: BTreeMap::new(),
        }
    }

    pub fn from_points<I>(symbol: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            symbol: symbol.into(),
            closes: points.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, date: NaiveDate, close: f64) {
        self.closes.insert(date, close);
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.closes.get(date).copied()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.closes.contains_key(date)
    }

    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.closes.iter().next().map(|(d, p)| (*d, *p))
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.closes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.closes.iter()
    }

    /// Rows with `start <= date < end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            closes: self
                .closes
                .range(start..end)
                .map(|(d, p)| (*d, *p))
                .collect(),
        }
    }
}

/// One symbol's column in a rebased price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub symbol: String,
    pub values: Vec<f64>,
}

/// Subject prices alongside benchmarks rescaled to the subject's first close.
/// The subject column comes first and is left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebasedSeries {
    pub subject: String,
    /// ISO dates shared by every column
    pub dates: Vec<String>,
    pub columns: Vec<SeriesColumn>,
}

impl RebasedSeries {
    pub fn column(&self, symbol: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl WideTable for RebasedSeries {
    fn categories(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.symbol.clone()).collect()
    }

    fn dates(&self) -> Vec<String> {
        self.dates.clone()
    }

    fn cell(&self, category: usize, date: usize) -> Option<f64> {
        self.columns
            .get(category)
            .and_then(|c| c.values.get(date))
            .copied()
    }
}

/// Provider income statement: reported item name -> period end -> value.
/// Missing cells are `None`.
pub type RawStatement = BTreeMap<String, BTreeMap<NaiveDate, Option<f64>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub item: LineItem,
    /// Aligned with `StatementTable::periods`
    pub values: Vec<Option<f64>>,
}

/// Canonical income statement, scaled for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    pub period_kind: PeriodKind,
    /// Period end dates, ascending
    pub periods: Vec<NaiveDate>,
    pub rows: Vec<StatementRow>,
}

impl StatementTable {
    pub fn row(&self, item: LineItem) -> Option<&StatementRow> {
        self.rows.iter().find(|r| r.item == item)
    }

    pub fn value(&self, item: LineItem, period: NaiveDate) -> Option<f64> {
        let idx = self.periods.iter().position(|p| *p == period)?;
        self.row(item).and_then(|r| r.values.get(idx).copied().flatten())
    }
}

impl WideTable for StatementTable {
    fn categories(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.item.label().to_string()).collect()
    }

    fn dates(&self) -> Vec<String> {
        self.periods.iter().map(|p| p.to_string()).collect()
    }

    fn cell(&self, category: usize, date: usize) -> Option<f64> {
        self.rows
            .get(category)
            .and_then(|r| r.values.get(date).copied().flatten())
    }
}

/// Long-form chart row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

/// Quarterly earnings report; `reported_eps` is `None` when the provider
/// marked the quarter as not reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsReport {
    pub fiscal_date_ending: NaiveDate,
    pub reported_eps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtmPoint {
    pub date: NaiveDate,
    pub quarterly: f64,
    /// Absent until four reported quarters are available
    pub ttm: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TtmSeries {
    pub points: Vec<TtmPoint>,
}

impl TtmSeries {
    pub const QUARTERLY_LABEL: &'static str = "Quarterly EPS";
    pub const TTM_LABEL: &'static str = "TTM EPS";

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl WideTable for TtmSeries {
    fn categories(&self) -> Vec<String> {
        vec![Self::QUARTERLY_LABEL.to_string(), Self::TTM_LABEL.to_string()]
    }

    fn dates(&self) -> Vec<String> {
        self.points.iter().map(|p| p.date.to_string()).collect()
    }

    fn cell(&self, category: usize, date: usize) -> Option<f64> {
        let point = self.points.get(date)?;
        match category {
            0 => Some(point.quarterly),
            1 => point.ttm,
            _ => None,
        }
    }
}

/// Parse a provider-reported number. The sentinels `None`, `-`, blank and
/// non-finite values all mean "not reported".
pub fn parse_reported(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Headline facts shown next to the statement chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSheet {
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(rename = "forwardPE", default)]
    pub forward_pe: Option<f64>,
    #[serde(rename = "averageVolume", default)]
    pub average_volume: Option<f64>,
    #[serde(rename = "financialCurrency", default)]
    pub financial_currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub category: String,
    pub value: Option<f64>,
}

impl FactSheet {
    pub fn rows(&self) -> Vec<FactRow> {
        vec![
            FactRow {
                category: "Beta".to_string(),
                value: self.beta,
            },
            FactRow {
                category: "P/E Ratio".to_string(),
                value: self.forward_pe,
            },
            FactRow {
                category: "Avg Vol (90D)".to_string(),
                value: self.average_volume,
            },
        ]
    }

    /// Y-axis label for price charts, e.g. `Price (USD)`
    pub fn price_axis_label(&self) -> String {
        match &self.financial_currency {
            Some(ccy) if !ccy.is_empty() => format!("Price ({})", ccy),
            _ => "Price".to_string(),
        }
    }
}

/// Screener hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerQuote {
    pub symbol: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// Display name of `symbol` among screener quotes, or `Unknown`
pub fn display_name<'a>(symbol: &str, quotes: &'a [ScreenerQuote]) -> &'a str {
    quotes
        .iter()
        .find(|q| q.symbol == symbol)
        .and_then(|q| q.display_name.as_deref())
        .unwrap_or("Unknown")
}
