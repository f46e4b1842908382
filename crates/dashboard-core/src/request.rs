use chrono::NaiveDate;
use serde::Serialize;

use crate::{NormalizeError, PeriodKind};

/// Parameters of a single dashboard request.
///
/// Built once from user input and passed by reference through the pipeline.
/// Construction guarantees `start < end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContext {
    ticker: String,
    benchmarks: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
    period_kind: PeriodKind,
}

impl RequestContext {
    pub fn new(
        ticker: impl Into<String>,
        benchmarks: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
        period_kind: PeriodKind,
    ) -> Result<Self, NormalizeError> {
        if start >= end {
            return Err(NormalizeError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let ticker = ticker.into().trim().to_uppercase();
        if ticker.is_empty() {
            return Err(NormalizeError::InvalidData("ticker must not be empty".to_string()));
        }

        let mut seen = vec![ticker.clone()];
        let benchmarks = benchmarks
            .into_iter()
            .map(|b| b.trim().to_uppercase())
            .filter(|b| {
                if b.is_empty() || seen.contains(b) {
                    false
                } else {
                    seen.push(b.clone());
                    true
                }
            })
            .collect();

        Ok(Self {
            ticker,
            benchmarks,
            start,
            end,
            period_kind,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn benchmarks(&self) -> &[String] {
        &self.benchmarks
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn period_kind(&self) -> PeriodKind {
        self.period_kind
    }

    /// Subject ticker followed by the benchmarks
    pub fn symbols(&self) -> Vec<&str> {
        std::iter::once(self.ticker.as_str())
            .chain(self.benchmarks.iter().map(|b| b.as_str()))
            .collect()
    }
}
