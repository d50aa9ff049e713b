//! Parallel evaluation of independent strategies over one price series.

use rayon::prelude::*;

use super::backtest::{BacktestConfig, run_backtest};
use super::error::BacktesterError;
use super::metrics::PerformanceSummary;
use super::price::PriceSeries;
use super::strategy::{MaCrossoverParams, Strategy};

#[derive(Debug)]
pub struct SweepOutcome {
    pub strategy: Strategy,
    pub result: Result<PerformanceSummary, BacktesterError>,
}

/// Every run gets its own simulation state; results come back in input order.
pub fn run_sweep(
    prices: &PriceSeries,
    strategies: &[Strategy],
    config: &BacktestConfig,
) -> Vec<SweepOutcome> {
    strategies
        .par_iter()
        .map(|strategy| {
            let result = run_backtest(prices, strategy, config).map(|r| r.summary);
            if let Err(e) = &result {
                log::warn!("{} failed: {}", strategy, e);
            }
            SweepOutcome {
                strategy: *strategy,
                result,
            }
        })
        .collect()
}

/// Cartesian product of window sizes; invalid pairs are returned as errors, not dropped.
pub fn ma_crossover_grid(
    short_windows: &[usize],
    long_windows: &[usize],
) -> Vec<Result<Strategy, BacktesterError>> {
    short_windows
        .iter()
        .flat_map(|&short| {
            long_windows.iter().map(move |&long| {
                MaCrossoverParams::new(short, long).map(Strategy::MovingAverageCrossover)
            })
        })
        .collect()
}
