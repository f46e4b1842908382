use chrono::NaiveDate;
use dashboard_core::{LineItem, NormalizeError, PeriodKind, RawStatement, StatementRow, StatementTable};
use std::collections::{BTreeMap, BTreeSet};

/// Raw currency units per displayed unit (values are shown in thousands)
pub const DISPLAY_DIVISOR: f64 = 1_000.0;

const QUARTERLY_FIELDS: [(LineItem, &str); 6] = [
    (LineItem::TotalRevenue, "Total Revenue"),
    (LineItem::CostOfRevenue, "Cost of Revenue"),
    (LineItem::GrossProfit, "Gross Profit"),
    (LineItem::OperatingExpense, "Operating Expense"),
    (LineItem::OperatingIncome, "Operating Income"),
    (LineItem::Ebitda, "EBITDA"),
];

const ANNUAL_FIELDS: [(LineItem, &str); 6] = [
    (LineItem::TotalRevenue, "TotalRevenue"),
    (LineItem::CostOfRevenue, "CostOfRevenue"),
    (LineItem::GrossProfit, "GrossProfit"),
    (LineItem::OperatingExpense, "OperatingExpense"),
    (LineItem::OperatingIncome, "OperatingIncome"),
    (LineItem::Ebitda, "EBITDA"),
];

/// Provider row names for each canonical line item, per reporting cadence.
///
/// Quarterly statements already arrive with display names; annual statements
/// use the provider's CamelCase keys.
#[derive(Debug, Clone, Copy)]
pub struct StatementSchema {
    period_kind: PeriodKind,
    fields: &'static [(LineItem, &'static str)],
}

impl StatementSchema {
    pub fn for_period(period_kind: PeriodKind) -> Self {
        let fields: &'static [(LineItem, &'static str)] = match period_kind {
            PeriodKind::Quarterly => &QUARTERLY_FIELDS,
            PeriodKind::Annual => &ANNUAL_FIELDS,
        };
        Self {
            period_kind,
            fields,
        }
    }

    pub fn period_kind(&self) -> PeriodKind {
        self.period_kind
    }

    pub fn fields(&self) -> &'static [(LineItem, &'static str)] {
        self.fields
    }

    pub fn source_name(&self, item: LineItem) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, name)| *name)
    }
}

fn present(cells: &BTreeMap<NaiveDate, Option<f64>>, period: &NaiveDate) -> Option<f64> {
    cells.get(period).copied().flatten().filter(|v| v.is_finite())
}

fn display_value(item: LineItem, raw: f64) -> f64 {
    let signed = if item.is_outflow() { -raw } else { raw };
    signed / DISPLAY_DIVISOR
}

/// Reduce a provider income statement to the canonical line items.
///
/// Outflow rows are negated once, every value is divided by
/// [`DISPLAY_DIVISOR`], and periods with no value on any kept row are dropped.
/// A recognised row missing from the source is an error.
pub fn normalize_income_statement(
    raw: &RawStatement,
    period_kind: PeriodKind,
) -> Result<StatementTable, NormalizeError> {
    let schema = StatementSchema::for_period(period_kind);

    let mut selected: Vec<(LineItem, &BTreeMap<NaiveDate, Option<f64>>)> =
        Vec::with_capacity(schema.fields().len());
    for &(item, source) in schema.fields() {
        let cells = raw.get(source).ok_or_else(|| NormalizeError::MissingLineItem {
            item: source.to_string(),
            period_kind,
        })?;
        selected.push((item, cells));
    }

    let all_periods: BTreeSet<NaiveDate> = selected
        .iter()
        .flat_map(|(_, cells)| cells.keys().copied())
        .collect();

    let periods: Vec<NaiveDate> = all_periods
        .iter()
        .filter(|p| selected.iter().any(|(_, cells)| present(cells, p).is_some()))
        .copied()
        .collect();

    let dropped = all_periods.len() - periods.len();
    if dropped > 0 {
        tracing::debug!("{} statement: dropped {} empty periods", period_kind, dropped);
    }

    let rows = selected
        .iter()
        .map(|(item, cells)| StatementRow {
            item: *item,
            values: periods
                .iter()
                .map(|p| present(cells, p).map(|v| display_value(*item, v)))
                .collect(),
        })
        .collect();

    Ok(StatementTable {
        period_kind,
        periods,
        rows,
    })
}
