use anyhow::{Context, Result};
use chrono::NaiveDate;
use dashboard_core::PeriodKind;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

const DEFAULT_BENCHMARKS: &str = "SPY,COMP";
const DEFAULT_WATCHLIST: &str = "PENN,BYD,FAF,R,DRVN,CZR,PLYA";
const DEFAULT_START_DATE: &str = "2024-01-10";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub benchmarks: Vec<String>,
    /// Symbols offered alongside the screener results
    pub watchlist: Vec<String>,
    pub start_date: NaiveDate,
    /// Defaults to today when unset
    pub end_date: Option<NaiveDate>,
    pub period_kind: PeriodKind,
    pub ticker: Option<String>,
    pub list_only: bool,
}

fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_date(raw: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid {} '{}', expected YYYY-MM-DD", what, raw))
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            data_dir: PathBuf::from(var("DASHBOARD_DATA_DIR", "data")),
            out_dir: PathBuf::from(var("DASHBOARD_OUT_DIR", "out")),
            benchmarks: split_symbols(&var("DASHBOARD_BENCHMARKS", DEFAULT_BENCHMARKS)),
            watchlist: split_symbols(&var("DASHBOARD_WATCHLIST", DEFAULT_WATCHLIST)),
            start_date: parse_date(&var("DASHBOARD_START_DATE", DEFAULT_START_DATE), "DASHBOARD_START_DATE")?,
            end_date: get("DASHBOARD_END_DATE")
                .map(|d| parse_date(&d, "DASHBOARD_END_DATE"))
                .transpose()?,
            period_kind: var("DASHBOARD_PERIOD", "annual")
                .parse::<PeriodKind>()
                .context("invalid DASHBOARD_PERIOD")?,
            ticker: get("DASHBOARD_TICKER").map(|t| t.trim().to_uppercase()),
            list_only: false,
        })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_args(mut self, args: &[String]) -> Result<Self> {
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .filter(|v| !v.starts_with("--"))
        };

        if let Some(ticker) = value("--ticker") {
            self.ticker = Some(ticker.trim().to_uppercase());
        }
        if let Some(idx) = args.iter().position(|a| a == "--benchmarks") {
            self.benchmarks = args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .flat_map(|a| split_symbols(a))
                .collect();
        }
        if let Some(start) = value("--start") {
            self.start_date = parse_date(start, "--start")?;
        }
        if let Some(end) = value("--end") {
            self.end_date = Some(parse_date(end, "--end")?);
        }
        if let Some(period) = value("--period") {
            self.period_kind = period.parse::<PeriodKind>().context("invalid --period")?;
        }
        if let Some(dir) = value("--data") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = value("--out") {
            self.out_dir = PathBuf::from(dir);
        }
        self.list_only = args.iter().any(|a| a == "--list");

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<DashboardConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.benchmarks, vec!["SPY", "COMP"]);
        assert_eq!(config.watchlist.len(), 7);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(config.end_date, None);
        assert_eq!(config.period_kind, PeriodKind::Annual);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.ticker.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("DASHBOARD_BENCHMARKS", "qqq, iwm"),
            ("DASHBOARD_PERIOD", "quarterly"),
            ("DASHBOARD_END_DATE", "2024-06-30"),
            ("DASHBOARD_TICKER", "czr"),
        ])
        .unwrap();
        assert_eq!(config.benchmarks, vec!["QQQ", "IWM"]);
        assert_eq!(config.period_kind, PeriodKind::Quarterly);
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.ticker.as_deref(), Some("CZR"));
    }

    #[test]
    fn test_bad_env_date_fails() {
        assert!(config_from(&[("DASHBOARD_START_DATE", "10/01/2024")]).is_err());
        assert!(config_from(&[("DASHBOARD_PERIOD", "weekly")]).is_err());
    }

    #[test]
    fn test_args_override_env() {
        let config = config_from(&[("DASHBOARD_TICKER", "CZR")])
            .unwrap()
            .with_args(&args(&[
                "dashboard",
                "--ticker",
                "penn",
                "--benchmarks",
                "spy",
                "dia",
                "--period",
                "q",
                "--start",
                "2024-02-01",
                "--out",
                "/tmp/dash",
                "--list",
            ]))
            .unwrap();
        assert_eq!(config.ticker.as_deref(), Some("PENN"));
        assert_eq!(config.benchmarks, vec!["SPY", "DIA"]);
        assert_eq!(config.period_kind, PeriodKind::Quarterly);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(config.out_dir, PathBuf::from("/tmp/dash"));
        assert!(config.list_only);
    }

    #[test]
    fn test_bad_arg_date_fails() {
        let result = config_from(&[])
            .unwrap()
            .with_args(&args(&["dashboard", "--end", "yesterday"]));
        assert!(result.is_err());
    }
}
