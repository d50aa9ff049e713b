//! RSI (Relative Strength Index).
//!
//! Average gain/loss are simple rolling means over the last n price changes,
//! not Wilder's recursive smoothing:
//! - gain[t] = max(C[t] - C[t-1], 0), loss[t] = max(C[t-1] - C[t], 0)
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - avg_loss == 0: RSI = 100
//!
//! Warmup: first n points carry no value (need n price changes).

use crate::domain::error::BacktesterError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn rsi(bars: &[PricePoint], period: usize) -> Result<IndicatorSeries, BacktesterError> {
    if period == 0 {
        return Err(BacktesterError::invalid_parameter(
            "rsi_period",
            "must be at least 1",
        ));
    }

    // changes[k] is the change from bar k to bar k+1
    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = if i >= period {
                let window = &changes[i - period..i];
                let avg_gain = window.iter().map(|c| c.max(0.0)).sum::<f64>() / period as f64;
                let avg_loss = window.iter().map(|c| (-c).max(0.0)).sum::<f64>() / period as f64;
                Some(relative_strength_index(avg_gain, avg_loss))
            } else {
                None
            };
            IndicatorPoint {
                date: bar.date,
                value,
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    })
}

fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
