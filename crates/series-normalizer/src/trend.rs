//! Period-over-period direction markers shown beside statement rows.
//! Purely decorative; nothing downstream depends on them.

use dashboard_core::WideTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "▬",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendMarker {
    pub category: String,
    pub date: String,
    /// `None` for the first period or when either side is missing
    pub trend: Option<Trend>,
    pub glyph: Option<String>,
}

/// One marker per cell, comparing each date with the one before it
pub fn trend_markers<T: WideTable + ?Sized>(table: &T) -> Vec<TrendMarker> {
    let categories = table.categories();
    let dates = table.dates();

    let mut markers = Vec::with_capacity(categories.len() * dates.len());
    for (ci, category) in categories.iter().enumerate() {
        for (di, date) in dates.iter().enumerate() {
            let trend = if di == 0 {
                None
            } else {
                match (table.cell(ci, di - 1), table.cell(ci, di)) {
                    (Some(prev), Some(cur)) => Some(Trend::between(prev, cur)),
                    _ => None,
                }
            };
            markers.push(TrendMarker {
                category: category.clone(),
                date: date.clone(),
                trend,
                glyph: trend.map(|t| t.glyph().to_string()),
            });
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::{LineItem, PeriodKind, StatementRow, StatementTable};

    #[test]
    fn test_trend_markers() {
        let table = StatementTable {
            period_kind: PeriodKind::Quarterly,
            periods: (1..=4)
                .map(|m| NaiveDate::from_ymd_opt(2024, m * 3, 28).unwrap())
                .collect(),
            rows: vec![StatementRow {
                item: LineItem::TotalRevenue,
                values: vec![Some(10.0), Some(12.0), None, Some(12.0)],
            }],
        };

        let markers = trend_markers(&table);
        let trends: Vec<Option<Trend>> = markers.iter().map(|m| m.trend).collect();
        assert_eq!(trends, vec![None, Some(Trend::Up), None, None]);
        assert_eq!(markers[1].glyph.as_deref(), Some("▲"));
        assert_eq!(markers[0].glyph, None);
    }

    #[test]
    fn test_trend_between() {
        assert_eq!(Trend::between(1.0, 2.0), Trend::Up);
        assert_eq!(Trend::between(2.0, 1.0), Trend::Down);
        assert_eq!(Trend::between(-3.0, -3.0), Trend::Flat);
        assert_eq!(Trend::Down.glyph(), "▼");
    }
}
