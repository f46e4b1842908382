//! Turns raw price and fundamental tables into the chart-ready series the
//! dashboard renders.
//!
//! Every operation is a pure function over in-memory tables: callers own the
//! inputs and receive freshly allocated outputs.

pub mod rebase;
pub mod statement;
pub mod tidy;
pub mod trend;
pub mod ttm;

pub use rebase::rebase_benchmarks;
pub use statement::{normalize_income_statement, StatementSchema, DISPLAY_DIVISOR};
pub use tidy::{pivot, unpivot, value_domain, DEFAULT_DOMAIN_PADDING};
pub use trend::{trend_markers, Trend, TrendMarker};
pub use ttm::{trailing_twelve_month, TTM_WINDOW};
