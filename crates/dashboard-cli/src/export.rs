use anyhow::{Context, Result};
use chrono::NaiveDate;
use dashboard_core::{
    FactRow, PeriodKind, RawStatement, RebasedSeries, RequestContext, TidyRow, TtmSeries, WideTable,
};
use serde::Serialize;
use series_normalizer::{trend_markers, unpivot, value_domain, TrendMarker, DEFAULT_DOMAIN_PADDING};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::dashboard::Dashboard;

/// Chart payload handed to the presentation layer
#[derive(Debug, Serialize)]
pub struct DashboardPayload<'a> {
    pub ticker: &'a str,
    pub display_name: &'a str,
    pub period_kind: PeriodKind,
    pub price_axis_label: String,
    pub facts: Vec<FactRow>,
    pub prices: Vec<TidyRow>,
    pub price_domain: Option<(f64, f64)>,
    pub statement: Vec<TidyRow>,
    pub trends: Vec<TrendMarker>,
    pub earnings: Vec<TidyRow>,
    pub warnings: &'a [String],
}

impl<'a> DashboardPayload<'a> {
    pub fn new(dashboard: &'a Dashboard, period_kind: PeriodKind) -> Self {
        let prices = unpivot(&dashboard.prices);
        let price_domain = value_domain(&prices, DEFAULT_DOMAIN_PADDING);
        let (statement, trends) = match &dashboard.statement {
            Some(table) => (unpivot(table), trend_markers(table)),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            ticker: &dashboard.ticker,
            display_name: &dashboard.display_name,
            period_kind,
            price_axis_label: dashboard.facts.price_axis_label(),
            facts: dashboard.facts.rows(),
            prices,
            price_domain,
            statement,
            trends,
            earnings: unpivot(&dashboard.earnings),
            warnings: &dashboard.warnings,
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Provider statement as fetched, one column per period end
pub fn write_raw_statement<W: Write>(writer: W, raw: &RawStatement) -> Result<()> {
    let periods: BTreeSet<NaiveDate> = raw.values().flat_map(|cells| cells.keys().copied()).collect();

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["item".to_string()];
    header.extend(periods.iter().map(|p| p.to_string()));
    wtr.write_record(&header)?;

    for (name, cells) in raw {
        let mut record = vec![name.clone()];
        record.extend(periods.iter().map(|p| cell(cells.get(p).copied().flatten())));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Categories as rows, dates as columns
pub fn write_wide<W: Write, T: WideTable + ?Sized>(writer: W, corner: &str, table: &T) -> Result<()> {
    let dates = table.dates();

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![corner.to_string()];
    header.extend(dates.iter().cloned());
    wtr.write_record(&header)?;

    for (ci, category) in table.categories().into_iter().enumerate() {
        let mut record = vec![category];
        record.extend((0..dates.len()).map(|di| cell(table.cell(ci, di))));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dates as rows, one column per symbol
pub fn write_rebased<W: Write>(writer: W, rebased: &RebasedSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["date".to_string()];
    header.extend(rebased.columns.iter().map(|c| c.symbol.clone()));
    wtr.write_record(&header)?;

    for (di, date) in rebased.dates.iter().enumerate() {
        let mut record = vec![date.clone()];
        record.extend(rebased.columns.iter().map(|c| cell(c.values.get(di).copied())));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_ttm<W: Write>(writer: W, ttm: &TtmSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "quarterly", "ttm"])?;
    for point in &ttm.points {
        wtr.write_record([point.date.to_string(), point.quarterly.to_string(), cell(point.ttm)])?;
    }
    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

/// Write every export for `dashboard` into `out_dir`, returning the files written
pub fn export_all(out_dir: &Path, request: &RequestContext, dashboard: &Dashboard) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let ticker = request.ticker();
    let period = request.period_kind();
    let mut written = Vec::new();

    if let Some(raw) = &dashboard.raw_statement {
        let path = out_dir.join(format!("{}_{}_income_stmt.csv", ticker, period));
        write_raw_statement(create(&path)?, raw)?;
        written.push(path);
    }

    if let Some(table) = &dashboard.statement {
        let path = out_dir.join(format!("{}_{}_income_stmt_normalized.csv", ticker, period));
        write_wide(create(&path)?, "item", table)?;
        written.push(path);
    }

    let path = out_dir.join(format!("{}_prices_rebased.csv", ticker));
    write_rebased(create(&path)?, &dashboard.prices)?;
    written.push(path);

    let path = out_dir.join(format!("{}_eps_ttm.csv", ticker));
    write_ttm(create(&path)?, &dashboard.earnings)?;
    written.push(path);

    let path = out_dir.join(format!("{}_dashboard.json", ticker));
    let payload = DashboardPayload::new(dashboard, period);
    serde_json::to_writer_pretty(create(&path)?, &payload)
        .with_context(|| format!("writing {}", path.display()))?;
    written.push(path);

    for path in &written {
        tracing::info!("wrote {}", path.display());
    }
    Ok(written)
}
