use anyhow::{Context, Result};
use dashboard_core::{
    display_name, FactSheet, MarketDataSource, RawStatement, RebasedSeries, RequestContext,
    ScreenerQuote, StatementTable, TtmSeries,
};
use futures_util::future::try_join_all;
use series_normalizer::{normalize_income_statement, rebase_benchmarks, trailing_twelve_month};

/// Everything the presentation layer needs for one ticker
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub ticker: String,
    pub display_name: String,
    pub facts: FactSheet,
    pub prices: RebasedSeries,
    /// Provider statement as fetched, kept for the raw CSV export
    pub raw_statement: Option<RawStatement>,
    pub statement: Option<StatementTable>,
    pub earnings: TtmSeries,
    /// Non-fatal problems shown next to the charts
    pub warnings: Vec<String>,
}

/// Load the raw tables for `request` and run them through the normalizer.
///
/// Prices are required; a statement or earnings failure only degrades the
/// dashboard and is recorded in `warnings`.
pub async fn build_dashboard<S>(
    source: &S,
    request: &RequestContext,
    quotes: &[ScreenerQuote],
) -> Result<Dashboard>
where
    S: MarketDataSource + ?Sized,
{
    let ticker = request.ticker();
    let period_kind = request.period_kind();

    let price_fetches = request
        .symbols()
        .into_iter()
        .map(|symbol| source.closes(symbol, request.start(), request.end()));

    let (closes, raw_statement, eps, facts) = tokio::join!(
        try_join_all(price_fetches),
        source.income_statement(ticker, period_kind),
        source.quarterly_eps(ticker),
        source.fact_sheet(ticker),
    );

    let mut closes = closes.context("loading close prices")?.into_iter();
    let subject = closes.next().context("no prices for subject ticker")?;
    let benchmarks: Vec<_> = closes.collect();

    let prices = rebase_benchmarks(&subject, &benchmarks)
        .with_context(|| format!("rebasing benchmarks against {}", ticker))?;
    tracing::info!(
        "{}: {} aligned prices against {} benchmarks",
        ticker,
        prices.len(),
        benchmarks.len()
    );

    let mut warnings = Vec::new();

    let (raw_statement, statement) = match raw_statement {
        Ok(raw) => match normalize_income_statement(&raw, period_kind) {
            Ok(table) => {
                tracing::info!("{}: {} {} periods", ticker, table.periods.len(), period_kind);
                (Some(raw), Some(table))
            }
            Err(e) => {
                tracing::error!("{}: {}", ticker, e);
                warnings.push(e.to_string());
                (Some(raw), None)
            }
        },
        Err(e) => {
            tracing::warn!("{}: income statement unavailable: {}", ticker, e);
            warnings.push(e.to_string());
            (None, None)
        }
    };

    let earnings = match eps {
        Ok(reports) => trailing_twelve_month(&reports),
        Err(e) => {
            tracing::warn!("{}: earnings unavailable: {}", ticker, e);
            warnings.push(e.to_string());
            TtmSeries::default()
        }
    };

    let facts = facts.unwrap_or_else(|e| {
        tracing::warn!("{}: fact sheet unavailable: {}", ticker, e);
        warnings.push(e.to_string());
        FactSheet::default()
    });

    Ok(Dashboard {
        ticker: ticker.to_string(),
        display_name: display_name(ticker, quotes).to_string(),
        facts,
        prices,
        raw_statement,
        statement,
        earnings,
        warnings,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use dashboard_core::{EpsReport, LineItem, NormalizeError, PeriodKind, PriceSeries};
    use std::collections::{BTreeMap, HashMap};

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[derive(Default)]
    pub(crate) struct StubSource {
        pub prices: HashMap<String, PriceSeries>,
        pub statement: Option<RawStatement>,
        pub eps: Vec<EpsReport>,
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn closes(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceSeries, NormalizeError> {
            Ok(self
                .prices
                .get(symbol)
                .map(|s| s.between(start, end))
                .unwrap_or_else(|| PriceSeries::new(symbol)))
        }

        async fn income_statement(
            &self,
            symbol: &str,
            _period_kind: PeriodKind,
        ) -> Result<RawStatement, NormalizeError> {
            self.statement
                .clone()
                .ok_or_else(|| NormalizeError::InvalidData(format!("no statement for {}", symbol)))
        }

        async fn quarterly_eps(&self, _symbol: &str) -> Result<Vec<EpsReport>, NormalizeError> {
            Ok(self.eps.clone())
        }

        async fn fact_sheet(&self, _symbol: &str) -> Result<FactSheet, NormalizeError> {
            Ok(FactSheet {
                beta: Some(1.5),
                financial_currency: Some("USD".to_string()),
                ..FactSheet::default()
            })
        }

        async fn screener_quotes(&self) -> Result<Vec<ScreenerQuote>, NormalizeError> {
            Ok(Vec::new())
        }
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::from_points(
            symbol,
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| (date(2024, 1, 10 + i as u32), *c)),
        )
    }

    pub(crate) fn quarterly_statement(with_ebitda: bool) -> RawStatement {
        let mut names = vec![
            ("Total Revenue", 1_000_000.0),
            ("Cost of Revenue", 400_000.0),
            ("Gross Profit", 600_000.0),
            ("Operating Expense", 250_000.0),
            ("Operating Income", 350_000.0),
        ];
        if with_ebitda {
            names.push(("EBITDA", 420_000.0));
        }
        names
            .into_iter()
            .map(|(name, value)| {
                let cells: BTreeMap<NaiveDate, Option<f64>> = [
                    (date(2023, 12, 31), Some(value)),
                    (date(2024, 3, 31), Some(value * 1.1)),
                ]
                .into_iter()
                .collect();
                (name.to_string(), cells)
            })
            .collect()
    }

    pub(crate) fn stub(with_ebitda: bool) -> StubSource {
        let mut prices = HashMap::new();
        prices.insert("PENN".to_string(), series("PENN", &[100.0, 110.0, 121.0]));
        prices.insert("SPY".to_string(), series("SPY", &[50.0, 55.0, 49.5]));
        StubSource {
            prices,
            statement: Some(quarterly_statement(with_ebitda)),
            eps: [1.0, 1.2, 0.9, 1.1, 1.3]
                .iter()
                .enumerate()
                .map(|(i, v)| EpsReport {
                    fiscal_date_ending: date(2023, 1, 1) + chrono::Duration::days(91 * i as i64),
                    reported_eps: Some(*v),
                })
                .collect(),
        }
    }

    pub(crate) fn request() -> RequestContext {
        RequestContext::new(
            "PENN",
            vec!["SPY".to_string()],
            date(2024, 1, 10),
            date(2024, 6, 1),
            PeriodKind::Quarterly,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_dashboard() {
        let quotes = vec![ScreenerQuote {
            symbol: "PENN".to_string(),
            display_name: Some("PENN Entertainment".to_string()),
        }];
        let dashboard = build_dashboard(&stub(true), &request(), &quotes).await.unwrap();

        assert_eq!(dashboard.display_name, "PENN Entertainment");
        assert_eq!(dashboard.prices.columns.len(), 2);
        let spy = dashboard.prices.column("SPY").unwrap();
        assert!((spy.values[2] - 99.0).abs() < 1e-9);

        let statement = dashboard.statement.as_ref().unwrap();
        assert_eq!(
            statement.value(LineItem::CostOfRevenue, date(2023, 12, 31)),
            Some(-400.0)
        );
        assert_eq!(dashboard.earnings.len(), 5);
        assert_eq!(dashboard.earnings.points[4].ttm.map(|v| (v * 10.0).round()), Some(45.0));
        assert_eq!(dashboard.facts.beta, Some(1.5));
        assert!(dashboard.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_line_item_degrades_statement() {
        let dashboard = build_dashboard(&stub(false), &request(), &[]).await.unwrap();
        assert!(dashboard.statement.is_none());
        assert!(dashboard.raw_statement.is_some());
        assert_eq!(dashboard.warnings.len(), 1);
        assert!(dashboard.warnings[0].contains("EBITDA"));
        assert_eq!(dashboard.display_name, "Unknown");
        assert_eq!(dashboard.prices.len(), 3);
    }

    #[tokio::test]
    async fn test_benchmark_without_prices_fails() {
        let mut source = stub(true);
        source.prices.remove("SPY");
        let err = build_dashboard(&source, &request(), &[]).await.unwrap_err();
        assert!(format!("{:#}", err).contains("SPY has no prices"));
    }
}
