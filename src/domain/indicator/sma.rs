//! Simple moving average over closing prices.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) points carry no value. Never looks ahead.

use crate::domain::error::BacktesterError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn rolling_mean(bars: &[PricePoint], window: usize) -> Result<IndicatorSeries, BacktesterError> {
    if window == 0 {
        return Err(BacktesterError::invalid_parameter(
            "window",
            "must be at least 1",
        ));
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = if i + 1 >= window {
                let sum: f64 = bars[i + 1 - window..=i].iter().map(|b| b.close).sum();
                Some(sum / window as f64)
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
        indicator_type: IndicatorType::Sma(window),
        values,
    })
}
