use dashboard_core::{TidyRow, WideTable};
use std::collections::BTreeMap;

/// Fraction of the value range added above and below the price chart
pub const DEFAULT_DOMAIN_PADDING: f64 = 0.1;

/// Flatten a wide table into one row per (category, date) cell.
///
/// Missing cells are kept with a `None` value, so the output always has
/// `categories * dates` rows.
pub fn unpivot<T: WideTable + ?Sized>(table: &T) -> Vec<TidyRow> {
    let categories = table.categories();
    let dates = table.dates();

    let mut rows = Vec::with_capacity(categories.len() * dates.len());
    for (ci, category) in categories.iter().enumerate() {
        for (di, date) in dates.iter().enumerate() {
            rows.push(TidyRow {
                date: date.clone(),
                category: category.clone(),
                value: table.cell(ci, di),
            });
        }
    }
    rows
}

/// Regroup tidy rows into `(category, date) -> value`. A later row for the
/// same cell replaces an earlier one.
pub fn pivot(rows: &[TidyRow]) -> BTreeMap<(String, String), Option<f64>> {
    rows.iter()
        .map(|r| ((r.category.clone(), r.date.clone()), r.value))
        .collect()
}

/// Y-axis domain covering every present value, widened by `padding` times the
/// range on each side. `None` when no row carries a value.
pub fn value_domain(rows: &[TidyRow], padding: f64) -> Option<(f64, f64)> {
    let mut values = rows.iter().filter_map(|r| r.value).filter(|v| v.is_finite());
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = padding * (max - min);
    Some((min - pad, max + pad))
}
