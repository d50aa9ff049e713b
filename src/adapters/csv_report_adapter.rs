//! CSV report adapter implementing ReportPort.
//!
//! Writes three files into the output directory:
//! `signals.csv` (signal table with indicator columns), `portfolio.csv`
//! (daily portfolio table) and `summary.csv` (one metric per row).

use std::fs;
use std::path::Path;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::BacktesterError;
use crate::domain::portfolio::PortfolioRecord;
use crate::domain::signal::SignalSeries;
use crate::ports::report_port::ReportPort;

pub const SIGNALS_FILE: &str = "signals.csv";
pub const PORTFOLIO_FILE: &str = "portfolio.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_error(path: &Path, e: impl std::fmt::Display) -> BacktesterError {
    BacktesterError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_default()
}

fn write_signals(signals: &SignalSeries, path: &Path) -> Result<(), BacktesterError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;

    let mut header = vec![
        "date".to_string(),
        "close".to_string(),
        "signal".to_string(),
        "position_change".to_string(),
    ];
    header.extend(signals.indicators.iter().map(|s| s.indicator_type.to_string()));
    wtr.write_record(&header).map_err(|e| report_error(path, e))?;

    for (i, record) in signals.records.iter().enumerate() {
        let mut row = vec![
            record.date.to_string(),
            format!("{:.4}", record.close),
            record.signal.to_string(),
            record.position_change.to_string(),
        ];
        row.extend(
            signals
                .indicators
                .iter()
                .map(|series| optional(series.value_at(i), 4)),
        );
        wtr.write_record(&row).map_err(|e| report_error(path, e))?;
    }

    wtr.flush().map_err(|e| report_error(path, e))?;
    Ok(())
}

fn write_portfolio(records: &[PortfolioRecord], path: &Path) -> Result<(), BacktesterError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;

    wtr.write_record([
        "date",
        "close",
        "shares_held",
        "cash",
        "holdings_value",
        "total",
        "daily_return",
        "fill",
    ])
    .map_err(|e| report_error(path, e))?;

    for record in records {
        let fill = record
            .fill
            .map(|f| format!("{} {} @ {:.2}", f.side, f.shares, f.price))
            .unwrap_or_default();
        wtr.write_record([
            record.date.to_string(),
            format!("{:.4}", record.close),
            record.shares_held.to_string(),
            format!("{:.2}", record.cash),
            format!("{:.2}", record.holdings_value),
            format!("{:.2}", record.total),
            optional(record.daily_return, 6),
            fill,
        ])
        .map_err(|e| report_error(path, e))?;
    }

    wtr.flush().map_err(|e| report_error(path, e))?;
    Ok(())
}

fn write_summary(
    result: &BacktestResult,
    config: &BacktestConfig,
    path: &Path,
) -> Result<(), BacktesterError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;
    let summary = &result.summary;

    let rows = [
        ("ticker", config.ticker.clone()),
        ("strategy", result.strategy.to_string()),
        ("start_date", config.start_date.to_string()),
        ("end_date", config.end_date.to_string()),
        ("initial_capital", format!("{:.2}", summary.initial_capital)),
        ("final_value", format!("{:.2}", summary.final_value)),
        ("total_return", format!("{:.6}", summary.total_return)),
        ("annualized_return", format!("{:.6}", summary.annualized_return)),
        ("max_drawdown", format!("{:.6}", summary.max_drawdown)),
        ("trade_count", summary.trade_count.to_string()),
    ];

    wtr.write_record(["metric", "value"])
        .map_err(|e| report_error(path, e))?;
    for (metric, value) in rows {
        wtr.write_record([metric, value.as_str()])
            .map_err(|e| report_error(path, e))?;
    }

    wtr.flush().map_err(|e| report_error(path, e))?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_path: &Path,
    ) -> Result<(), BacktesterError> {
        fs::create_dir_all(output_path)?;

        write_signals(&result.signals, &output_path.join(SIGNALS_FILE))?;
        write_portfolio(&result.portfolio, &output_path.join(PORTFOLIO_FILE))?;
        write_summary(result, config, &output_path.join(SUMMARY_FILE))?;

        log::info!("report written to {}", output_path.display());
        Ok(())
    }
}
