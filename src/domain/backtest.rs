//! Backtest pipeline: prices -> signals -> portfolio -> summary.
//!
//! BacktestConfig defines the run parameters.

use chrono::NaiveDate;

use super::error::BacktesterError;
use super::metrics::PerformanceSummary;
use super::portfolio::{PortfolioRecord, run_simulation};
use super::price::PriceSeries;
use super::signal::SignalSeries;
use super::strategy::Strategy;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: Strategy,
    pub signals: SignalSeries,
    pub portfolio: Vec<PortfolioRecord>,
    pub summary: PerformanceSummary,
}

impl BacktestResult {
    pub fn final_value(&self) -> f64 {
        self.summary.final_value
    }
}

/// Run one strategy over one price series.
///
/// The annualized return is measured over the configured calendar period,
/// not the span of the data actually returned.
pub fn run_backtest(
    prices: &PriceSeries,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktesterError> {
    let minimum = strategy.warmup_bars();
    if prices.len() < minimum {
        return Err(BacktesterError::InsufficientData {
            bars: prices.len(),
            minimum,
        });
    }

    log::debug!(
        "backtest {} with {}: {} bars, {} to {}",
        config.ticker,
        strategy,
        prices.len(),
        prices.first_date(),
        prices.last_date()
    );

    let signals = strategy.generate_signals(prices)?;
    let portfolio = run_simulation(&signals.records, config.initial_capital)?;
    let summary = PerformanceSummary::compute(
        &portfolio,
        config.initial_capital,
        config.start_date,
        config.end_date,
    )?;

    Ok(BacktestResult {
        strategy: *strategy,
        signals,
        portfolio,
        summary,
    })
}
