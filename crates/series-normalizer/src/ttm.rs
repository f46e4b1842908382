use chrono::NaiveDate;
use dashboard_core::{EpsReport, TtmPoint, TtmSeries};
use std::collections::BTreeMap;

/// Quarters summed into one trailing-twelve-month value
pub const TTM_WINDOW: usize = 4;

/// Trailing-twelve-month EPS for each reported quarter.
///
/// Quarters marked as not reported are dropped (never counted as zero), the
/// rest are ordered by date, and each quarter gets the sum of itself and the
/// three before it. The first three quarters have no TTM value. When a date
/// appears twice the later report wins, even if it is not reported.
pub fn trailing_twelve_month(reports: &[EpsReport]) -> TtmSeries {
    let latest: BTreeMap<NaiveDate, Option<f64>> = reports
        .iter()
        .map(|r| (r.fiscal_date_ending, r.reported_eps))
        .collect();
    let reported: BTreeMap<NaiveDate, f64> = latest
        .into_iter()
        .filter_map(|(date, eps)| eps.filter(|v| v.is_finite()).map(|v| (date, v)))
        .collect();

    let skipped = reports.len() - reported.len();
    if skipped > 0 {
        tracing::debug!("TTM: skipped {} unreported or duplicate quarters", skipped);
    }

    let values: Vec<f64> = reported.values().copied().collect();
    let points = reported
        .iter()
        .enumerate()
        .map(|(i, (date, quarterly))| TtmPoint {
            date: *date,
            quarterly: *quarterly,
            ttm: if i + 1 >= TTM_WINDOW {
                Some(values[i + 1 - TTM_WINDOW..=i].iter().sum())
            } else {
                None
            },
        })
        .collect();

    TtmSeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter_end(i: usize) -> NaiveDate {
        let year = 2022 + (i / 4) as i32;
        let (month, day) = [(3, 31), (6, 30), (9, 30), (12, 31)][i % 4];
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn reports(values: &[Option<f64>]) -> Vec<EpsReport> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| EpsReport {
                fiscal_date_ending: quarter_end(i),
                reported_eps: *v,
            })
            .collect()
    }

    #[test]
    fn test_ttm_concrete_scenario() {
        let eps = [1.0, 1.2, 0.9, 1.1, 1.3, 1.0, 0.95, 1.15];
        let series = trailing_twelve_month(&reports(&eps.map(Some)));

        assert_eq!(series.len(), 8);
        for point in &series.points[..3] {
            assert_eq!(point.ttm, None);
        }
        assert!((series.points[3].ttm.unwrap() - 4.2).abs() < 1e-9);
        assert!((series.points[7].ttm.unwrap() - 4.4).abs() < 1e-9);
        assert_eq!(series.points.iter().filter(|p| p.ttm.is_some()).count(), 5);
        assert_eq!(series.points[5].quarterly, 1.0);
    }

    #[test]
    fn test_ttm_window_sums() {
        let eps: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let series = trailing_twelve_month(&reports(&eps.iter().map(|v| Some(*v)).collect::<Vec<_>>()));
        for (i, point) in series.points.iter().enumerate().skip(3) {
            let expected: f64 = eps[i - 3..=i].iter().sum();
            assert_eq!(point.ttm, Some(expected));
        }
    }

    #[test]
    fn test_descending_input_is_sorted() {
        let mut input = reports(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]);
        input.reverse();
        let series = trailing_twelve_month(&input);
        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, (0..5).map(quarter_end).collect::<Vec<_>>());
        assert_eq!(series.points[4].ttm, Some(14.0));
    }

    #[test]
    fn test_not_reported_quarters_are_dropped() {
        let series = trailing_twelve_month(&reports(&[
            Some(1.0),
            None,
            Some(2.0),
            Some(3.0),
            Some(f64::NAN),
            Some(4.0),
        ]));
        assert_eq!(series.len(), 4);
        assert_eq!(series.points[2].ttm, None);
        assert_eq!(series.points[3].ttm, Some(10.0));
        assert_eq!(series.points[3].date, quarter_end(5));
    }

    #[test]
    fn test_duplicate_quarter_keeps_later_row() {
        let mut input = reports(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        input.push(EpsReport {
            fiscal_date_ending: quarter_end(1),
            reported_eps: Some(2.5),
        });
        let series = trailing_twelve_month(&input);
        assert_eq!(series.len(), 4);
        assert_eq!(series.points[1].quarterly, 2.5);
        assert_eq!(series.points[3].ttm, Some(10.5));

        input.push(EpsReport {
            fiscal_date_ending: quarter_end(1),
            reported_eps: None,
        });
        let series = trailing_twelve_month(&input);
        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![quarter_end(0), quarter_end(2), quarter_end(3)]);
        assert!(series.points.iter().all(|p| p.ttm.is_none()));
    }

    #[test]
    fn test_short_series_has_no_ttm() {
        let series = trailing_twelve_month(&reports(&[Some(0.5), Some(0.6), Some(0.7)]));
        assert!(series.points.iter().all(|p| p.ttm.is_none()));
        assert!(trailing_twelve_month(&[]).is_empty());
    }
}
