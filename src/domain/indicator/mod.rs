//! Technical indicators derived from a price series.
//!
//! - `IndicatorPoint`: one dated value, `None` while the indicator is still warming up
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a series aligned 1:1 with the source price series

pub mod rsi;
pub mod sma;

pub use rsi::rsi;
pub use sma::rolling_mean;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// Number of points that carry a value.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(window) => write!(f, "SMA({})", window),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
