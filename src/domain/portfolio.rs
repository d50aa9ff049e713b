//! Single-position portfolio simulation.
//!
//! The run is a fold over the signal records in date order. [`SimulationState`]
//! is the accumulator and [`SimulationState::step`] the per-day transition:
//! - Buy while flat: buy `floor(cash / close)` whole shares (a zero-share buy is a no-op)
//! - Sell while holding: liquidate at the close
//! - anything else leaves the state untouched

use chrono::NaiveDate;

use super::error::BacktesterError;
use super::signal::{PositionChange, SignalRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub cash: f64,
    pub shares_held: u64,
}

/// A trade actually executed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub side: PositionChange,
    pub shares: u64,
    pub price: f64,
}

impl Fill {
    pub fn value(&self) -> f64 {
        self.shares as f64 * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub shares_held: u64,
    pub cash: f64,
    pub holdings_value: f64,
    pub total: f64,
    pub daily_return: Option<f64>,
    pub fill: Option<Fill>,
}

impl SimulationState {
    pub fn new(initial_capital: f64) -> Self {
        SimulationState {
            cash: initial_capital,
            shares_held: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares_held == 0
    }

    pub fn holdings_value(&self, close: f64) -> f64 {
        self.shares_held as f64 * close
    }

    /// Apply one day's position change at that day's close.
    pub fn step(self, change: PositionChange, close: f64) -> (Self, Option<Fill>) {
        match change {
            PositionChange::Buy if self.is_flat() => {
                let mut shares = (self.cash / close).floor() as u64;
                // the quotient can round up to the next integer
                if shares > 0 && shares as f64 * close > self.cash {
                    shares -= 1;
                }
                if shares == 0 {
                    return (self, None);
                }
                let next = SimulationState {
                    cash: self.cash - shares as f64 * close,
                    shares_held: shares,
                };
                let fill = Fill {
                    side: PositionChange::Buy,
                    shares,
                    price: close,
                };
                (next, Some(fill))
            }
            PositionChange::Sell if !self.is_flat() => {
                let next = SimulationState {
                    cash: self.cash + self.holdings_value(close),
                    shares_held: 0,
                };
                let fill = Fill {
                    side: PositionChange::Sell,
                    shares: self.shares_held,
                    price: close,
                };
                (next, Some(fill))
            }
            _ => (self, None),
        }
    }
}

pub fn run_simulation(
    signals: &[SignalRecord],
    initial_capital: f64,
) -> Result<Vec<PortfolioRecord>, BacktesterError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(BacktesterError::invalid_parameter(
            "initial_capital",
            format!("must be positive, got {}", initial_capital),
        ));
    }
    if signals.is_empty() {
        return Err(BacktesterError::InsufficientData {
            bars: 0,
            minimum: 1,
        });
    }

    let (_, mut records) = signals.iter().fold(
        (
            SimulationState::new(initial_capital),
            Vec::with_capacity(signals.len()),
        ),
        |(state, mut records), day| {
            let (next, fill) = state.step(day.position_change, day.close);
            if let Some(fill) = &fill {
                log::info!(
                    "{}: {} {} shares at {:.2}",
                    day.date,
                    fill.side,
                    fill.shares,
                    fill.price
                );
            }
            let holdings_value = next.holdings_value(day.close);
            records.push(PortfolioRecord {
                date: day.date,
                close: day.close,
                shares_held: next.shares_held,
                cash: next.cash,
                holdings_value,
                total: next.cash + holdings_value,
                daily_return: None,
                fill,
            });
            (next, records)
        },
    );

    for i in 1..records.len() {
        let prev = records[i - 1].total;
        records[i].daily_return = if prev > 0.0 {
            Some(records[i].total / prev - 1.0)
        } else {
            None
        };
    }

    Ok(records)
}
