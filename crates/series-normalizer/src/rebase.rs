use chrono::NaiveDate;
use dashboard_core::{NormalizeError, PriceSeries, RebasedSeries, SeriesColumn};
use std::collections::BTreeSet;

/// Period-over-period percentage change. The first period is 0, and a change
/// off a zero close (non-finite) is treated as 0 so the series carries forward.
pub fn pct_changes(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut changes = Vec::with_capacity(values.len());
    changes.push(0.0);
    changes.extend(values.windows(2).map(|w| {
        let change = w[1] / w[0] - 1.0;
        if change.is_finite() {
            change
        } else {
            0.0
        }
    }));
    changes
}

/// Running product of `1 + change`
pub fn cumulative_growth(changes: &[f64]) -> Vec<f64> {
    changes
        .iter()
        .scan(1.0, |acc, change| {
            *acc *= 1.0 + change;
            Some(*acc)
        })
        .collect()
}

/// Rescale each benchmark so it starts at the subject's first close while
/// keeping its own relative moves.
///
/// Series are aligned on the dates present in every input; dates missing from
/// any series are dropped rather than reported as an error. The subject column
/// comes first in the output and is not modified. Every symbol, subject
/// included, may appear only once.
pub fn rebase_benchmarks(
    subject: &PriceSeries,
    benchmarks: &[PriceSeries],
) -> Result<RebasedSeries, NormalizeError> {
    let mut seen = BTreeSet::new();
    if let Some(duplicate) = std::iter::once(subject)
        .chain(benchmarks.iter())
        .find(|&s| !seen.insert(s.symbol.as_str()))
    {
        return Err(NormalizeError::InvalidData(format!(
            "{} appears more than once",
            duplicate.symbol
        )));
    }

    if let Some(empty) = std::iter::once(subject)
        .chain(benchmarks.iter())
        .find(|s| s.is_empty())
    {
        return Err(NormalizeError::EmptySeries(format!(
            "{} has no prices",
            empty.symbol
        )));
    }

    let dates: Vec<NaiveDate> = subject
        .dates()
        .filter(|d| benchmarks.iter().all(|b| b.contains(d)))
        .copied()
        .collect();

    if dates.is_empty() {
        let symbols: Vec<&str> = std::iter::once(subject.symbol.as_str())
            .chain(benchmarks.iter().map(|b| b.symbol.as_str()))
            .collect();
        return Err(NormalizeError::EmptySeries(format!(
            "no dates shared by {}",
            symbols.join(", ")
        )));
    }

    for series in std::iter::once(subject).chain(benchmarks.iter()) {
        let dropped = series.len() - dates.len();
        if dropped > 0 {
            tracing::debug!(
                "{}: dropped {} dates not shared by every series",
                series.symbol,
                dropped
            );
        }
    }

    let aligned = |series: &PriceSeries| -> Vec<f64> {
        dates.iter().filter_map(|d| series.get(d)).collect()
    };

    let subject_values = aligned(subject);
    let anchor = subject_values[0];

    let mut columns = Vec::with_capacity(benchmarks.len() + 1);
    columns.push(SeriesColumn {
        symbol: subject.symbol.clone(),
        values: subject_values,
    });

    for benchmark in benchmarks {
        let growth = cumulative_growth(&pct_changes(&aligned(benchmark)));
        columns.push(SeriesColumn {
            symbol: benchmark.symbol.clone(),
            values: growth.iter().map(|g| anchor * g).collect(),
        });
    }

    Ok(RebasedSeries {
        subject: subject.symbol.clone(),
        dates: dates.iter().map(|d| d.to_string()).collect(),
        columns,
    })
}
