//! Per-day signal records produced by the strategy engine.

use chrono::NaiveDate;
use std::fmt;

use super::indicator::{IndicatorSeries, IndicatorType};

/// Actionable trade decision for one day. Always unit magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionChange {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl PositionChange {
    /// Collapse a day-over-day signal difference into a trade decision.
    ///
    /// Only unit transitions trade; a jump of two (short to long or back) holds.
    pub fn from_signal_diff(diff: i8) -> Self {
        match diff {
            1 => PositionChange::Buy,
            -1 => PositionChange::Sell,
            _ => PositionChange::Hold,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            PositionChange::Buy => 1,
            PositionChange::Sell => -1,
            PositionChange::Hold => 0,
        }
    }

    pub fn is_trade(self) -> bool {
        self != PositionChange::Hold
    }
}

impl fmt::Display for PositionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionChange::Buy => write!(f, "BUY"),
            PositionChange::Sell => write!(f, "SELL"),
            PositionChange::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: i8,
    pub position_change: PositionChange,
}

/// Signal records aligned to the price series, plus the indicators they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub records: Vec<SignalRecord>,
    pub indicators: Vec<IndicatorSeries>,
}

impl SignalSeries {
    pub fn indicator(&self, indicator_type: IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators
            .iter()
            .find(|s| s.indicator_type == indicator_type)
    }

    pub fn trade_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.position_change.is_trade())
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `position_change[t] = diff(signal)[t]`, Hold on the first day.
pub(crate) fn diff_position_changes(signals: &[i8]) -> Vec<PositionChange> {
    let mut changes = Vec::with_capacity(signals.len());
    if signals.is_empty() {
        return changes;
    }
    changes.push(PositionChange::Hold);
    changes.extend(
        signals
            .windows(2)
            .map(|w| PositionChange::from_signal_diff(w[1] - w[0])),
    );
    changes
}
