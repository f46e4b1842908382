use thiserror::Error;

use crate::PeriodKind;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Missing line item '{item}' in {period_kind} income statement")]
    MissingLineItem {
        item: String,
        period_kind: PeriodKind,
    },

    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("Invalid date range: start {start} must fall before end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
