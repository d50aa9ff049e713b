//! Strategy variants and signal generation.
//!
//! Each variant carries its own validated parameter struct. Adding a strategy
//! means adding a variant and its arm in [`Strategy::generate_signals`].

use std::fmt;
use std::str::FromStr;

use super::error::BacktesterError;
use super::indicator::{IndicatorType, rolling_mean, rsi};
use super::price::PriceSeries;
use super::signal::{PositionChange, SignalRecord, SignalSeries, diff_position_changes};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaCrossoverParams {
    short_window: usize,
    long_window: usize,
}

impl MaCrossoverParams {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, BacktesterError> {
        if short_window == 0 {
            return Err(BacktesterError::invalid_parameter(
                "short_window",
                "must be at least 1",
            ));
        }
        if long_window == 0 {
            return Err(BacktesterError::invalid_parameter(
                "long_window",
                "must be at least 1",
            ));
        }
        if short_window >= long_window {
            return Err(BacktesterError::invalid_parameter(
                "short_window",
                format!(
                    "must be less than long_window ({} >= {})",
                    short_window, long_window
                ),
            ));
        }
        Ok(MaCrossoverParams {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Default for MaCrossoverParams {
    fn default() -> Self {
        MaCrossoverParams {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiParams {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiParams {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Result<Self, BacktesterError> {
        if period == 0 {
            return Err(BacktesterError::invalid_parameter(
                "rsi_period",
                "must be at least 1",
            ));
        }
        for (name, value) in [("oversold", oversold), ("overbought", overbought)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(BacktesterError::invalid_parameter(
                    name,
                    format!("must be between 0 and 100, got {}", value),
                ));
            }
        }
        if oversold >= overbought {
            return Err(BacktesterError::invalid_parameter(
                "oversold",
                format!(
                    "must be less than overbought ({} >= {})",
                    oversold, overbought
                ),
            ));
        }
        Ok(RsiParams {
            period,
            oversold,
            overbought,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn oversold(&self) -> f64 {
        self.oversold
    }

    pub fn overbought(&self) -> f64 {
        self.overbought
    }

    /// 1 when oversold, -1 when overbought, 0 otherwise or while RSI is undefined.
    fn raw_signal(&self, value: Option<f64>) -> i8 {
        match value {
            Some(v) if v < self.oversold => 1,
            Some(v) if v > self.overbought => -1,
            _ => 0,
        }
    }
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            period: DEFAULT_RSI_PERIOD,
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MovingAverageCrossover,
    RsiThreshold,
    BuyAndHold,
}

impl FromStr for StrategyKind {
    type Err = BacktesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ma_crossover" | "moving_average" | "sma_crossover" => {
                Ok(StrategyKind::MovingAverageCrossover)
            }
            "rsi" | "rsi_threshold" => Ok(StrategyKind::RsiThreshold),
            "buy_and_hold" | "buy_hold" => Ok(StrategyKind::BuyAndHold),
            other => Err(BacktesterError::invalid_parameter(
                "kind",
                format!(
                    "unknown strategy '{}' (expected ma_crossover, rsi or buy_and_hold)",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MovingAverageCrossover => write!(f, "ma_crossover"),
            StrategyKind::RsiThreshold => write!(f, "rsi"),
            StrategyKind::BuyAndHold => write!(f, "buy_and_hold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    MovingAverageCrossover(MaCrossoverParams),
    RsiThreshold(RsiParams),
    BuyAndHold,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::MovingAverageCrossover(_) => StrategyKind::MovingAverageCrossover,
            Strategy::RsiThreshold(_) => StrategyKind::RsiThreshold,
            Strategy::BuyAndHold => StrategyKind::BuyAndHold,
        }
    }

    /// Bars needed before the strategy can emit its first indicator-driven signal.
    pub fn warmup_bars(&self) -> usize {
        match self {
            Strategy::MovingAverageCrossover(p) => p.long_window,
            Strategy::RsiThreshold(p) => p.period + 1,
            Strategy::BuyAndHold => 1,
        }
    }

    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        match self {
            Strategy::MovingAverageCrossover(p) => vec![
                IndicatorType::Sma(p.short_window),
                IndicatorType::Sma(p.long_window),
            ],
            Strategy::RsiThreshold(p) => vec![IndicatorType::Rsi(p.period)],
            Strategy::BuyAndHold => vec![],
        }
    }

    pub fn generate_signals(&self, prices: &PriceSeries) -> Result<SignalSeries, BacktesterError> {
        let bars = prices.points();

        let (signals, changes, indicators) = match self {
            Strategy::MovingAverageCrossover(p) => {
                let short_ma = rolling_mean(bars, p.short_window)?;
                let long_ma = rolling_mean(bars, p.long_window)?;
                let signals: Vec<i8> = (0..bars.len())
                    .map(|i| match (short_ma.value_at(i), long_ma.value_at(i)) {
                        (Some(short), Some(long)) if short > long => 1,
                        _ => 0,
                    })
                    .collect();
                let changes = diff_position_changes(&signals);
                (signals, changes, vec![short_ma, long_ma])
            }
            Strategy::RsiThreshold(p) => {
                let rsi_series = rsi(bars, p.period)?;
                let signals: Vec<i8> = (0..bars.len())
                    .map(|i| p.raw_signal(rsi_series.value_at(i)))
                    .collect();
                let changes = diff_position_changes(&signals);
                (signals, changes, vec![rsi_series])
            }
            Strategy::BuyAndHold => {
                let signals = vec![1i8; bars.len()];
                let changes: Vec<PositionChange> = (0..bars.len())
                    .map(|i| {
                        if i == 0 {
                            PositionChange::Buy
                        } else {
                            PositionChange::Hold
                        }
                    })
                    .collect();
                (signals, changes, vec![])
            }
        };

        let records: Vec<SignalRecord> = bars
            .iter()
            .zip(signals)
            .zip(changes)
            .map(|((bar, signal), position_change)| SignalRecord {
                date: bar.date,
                close: bar.close,
                signal,
                position_change,
            })
            .collect();

        let series = SignalSeries {
            records,
            indicators,
        };
        log::debug!(
            "{}: {} signal records, {} trade signals",
            self,
            series.len(),
            series.trade_count()
        );
        Ok(series)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::MovingAverageCrossover(p) => write!(
                f,
                "Moving Average Crossover ({}/{})",
                p.short_window, p.long_window
            ),
            Strategy::RsiThreshold(p) => write!(
                f,
                "RSI Threshold ({}, {}/{})",
                p.period, p.oversold, p.overbought
            ),
            Strategy::BuyAndHold => write!(f, "Buy and Hold"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_closes(
            prices
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + chrono::Duration::days(i as i64), c)),
        )
        .unwrap()
    }

    fn changes(signals: &SignalSeries) -> Vec<PositionChange> {
        signals.records.iter().map(|r| r.position_change).collect()
    }

    #[test]
    fn ma_params_reject_inverted_windows() {
        let err = MaCrossoverParams::new(200, 50).unwrap_err();
        assert!(matches!(err, BacktesterError::InvalidParameter { ref name, .. } if name == "short_window"));
        assert!(MaCrossoverParams::new(50, 50).is_err());
    }

    #[test]
    fn ma_params_reject_zero_windows() {
        assert!(MaCrossoverParams::new(0, 5).is_err());
        assert!(MaCrossoverParams::new(2, 0).is_err());
    }

    #[test]
    fn ma_params_defaults() {
        let p = MaCrossoverParams::default();
        assert_eq!(p.short_window(), 50);
        assert_eq!(p.long_window(), 200);
    }

    #[test]
    fn rsi_params_validation() {
        assert!(RsiParams::new(14, 30.0, 70.0).is_ok());
        assert!(RsiParams::new(0, 30.0, 70.0).is_err());
        assert!(RsiParams::new(14, 70.0, 30.0).is_err());
        assert!(RsiParams::new(14, 50.0, 50.0).is_err());
        assert!(RsiParams::new(14, -5.0, 70.0).is_err());
        assert!(RsiParams::new(14, 30.0, 120.0).is_err());
    }

    #[test]
    fn rsi_params_defaults() {
        let p = RsiParams::default();
        assert_eq!(p.period(), 14);
        assert_eq!(p.oversold(), 30.0);
        assert_eq!(p.overbought(), 70.0);
    }

    #[test]
    fn strategy_kind_parsing() {
        assert_eq!(
            "ma_crossover".parse::<StrategyKind>().unwrap(),
            StrategyKind::MovingAverageCrossover
        );
        assert_eq!(" RSI ".parse::<StrategyKind>().unwrap(), StrategyKind::RsiThreshold);
        assert_eq!(
            "buy_and_hold".parse::<StrategyKind>().unwrap(),
            StrategyKind::BuyAndHold
        );
        assert!("momentum".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn ma_flat_prices_never_signal() {
        let strategy = Strategy::MovingAverageCrossover(MaCrossoverParams::new(2, 3).unwrap());
        let signals = strategy.generate_signals(&series(&[10.0; 5])).unwrap();

        assert!(signals.records.iter().all(|r| r.signal == 0));
        assert!(signals.records.iter().all(|r| r.position_change == PositionChange::Hold));
        assert_eq!(signals.indicators.len(), 2);
    }

    #[test]
    fn ma_crossover_buy_then_sell() {
        let strategy = Strategy::MovingAverageCrossover(MaCrossoverParams::new(2, 3).unwrap());
        let signals = strategy
            .generate_signals(&series(&[10.0, 10.0, 10.0, 12.0, 14.0, 10.0, 6.0]))
            .unwrap();

        let raw: Vec<i8> = signals.records.iter().map(|r| r.signal).collect();
        assert_eq!(raw, vec![0, 0, 0, 1, 1, 0, 0]);
        assert_eq!(
            changes(&signals),
            vec![
                PositionChange::Hold,
                PositionChange::Hold,
                PositionChange::Hold,
                PositionChange::Buy,
                PositionChange::Hold,
                PositionChange::Sell,
                PositionChange::Hold,
            ]
        );
    }

    #[test]
    fn ma_indicators_exposed() {
        let strategy = Strategy::MovingAverageCrossover(MaCrossoverParams::new(2, 3).unwrap());
        let signals = strategy.generate_signals(&series(&[1.0, 2.0, 3.0])).unwrap();
        assert!(signals.indicator(IndicatorType::Sma(2)).is_some());
        assert!(signals.indicator(IndicatorType::Sma(3)).is_some());
        assert!(signals.indicator(IndicatorType::Rsi(14)).is_none());
    }

    #[test]
    fn rsi_double_jump_collapses_to_hold() {
        // period 1: a down day gives RSI 0 (oversold), an up day gives RSI 100 (overbought)
        let strategy = Strategy::RsiThreshold(RsiParams::new(1, 30.0, 70.0).unwrap());
        let signals = strategy
            .generate_signals(&series(&[10.0, 9.0, 10.0, 9.0]))
            .unwrap();

        let raw: Vec<i8> = signals.records.iter().map(|r| r.signal).collect();
        assert_eq!(raw, vec![0, 1, -1, 1]);
        assert_eq!(
            changes(&signals),
            vec![
                PositionChange::Hold,
                PositionChange::Buy,
                PositionChange::Hold,
                PositionChange::Hold,
            ]
        );
    }

    #[test]
    fn rsi_leaving_oversold_sells() {
        // changes: -1, -1, +1 with period 2 -> RSI None, None, 0, 50
        let strategy = Strategy::RsiThreshold(RsiParams::new(2, 30.0, 70.0).unwrap());
        let signals = strategy
            .generate_signals(&series(&[10.0, 9.0, 8.0, 9.0]))
            .unwrap();

        let raw: Vec<i8> = signals.records.iter().map(|r| r.signal).collect();
        assert_eq!(raw, vec![0, 0, 1, 0]);
        assert_eq!(
            changes(&signals),
            vec![
                PositionChange::Hold,
                PositionChange::Hold,
                PositionChange::Buy,
                PositionChange::Sell,
            ]
        );
    }

    #[test]
    fn rsi_undefined_days_are_neutral() {
        let strategy = Strategy::RsiThreshold(RsiParams::default());
        let signals = strategy
            .generate_signals(&series(&[10.0, 9.0, 8.0, 7.0]))
            .unwrap();
        assert!(signals.records.iter().all(|r| r.signal == 0));
    }

    #[test]
    fn buy_and_hold_buys_first_day_only() {
        let signals = Strategy::BuyAndHold
            .generate_signals(&series(&[100.0, 90.0, 80.0]))
            .unwrap();
        assert_eq!(
            changes(&signals),
            vec![
                PositionChange::Buy,
                PositionChange::Hold,
                PositionChange::Hold,
            ]
        );
        assert!(signals.indicators.is_empty());
    }

    #[test]
    fn records_aligned_with_prices() {
        let prices = series(&[5.0, 6.0, 7.0]);
        let signals = Strategy::BuyAndHold.generate_signals(&prices).unwrap();
        for (bar, record) in prices.points().iter().zip(&signals.records) {
            assert_eq!(bar.date, record.date);
            assert_eq!(bar.close, record.close);
        }
    }

    #[test]
    fn warmup_bars_per_variant() {
        let ma = Strategy::MovingAverageCrossover(MaCrossoverParams::new(5, 20).unwrap());
        let rsi = Strategy::RsiThreshold(RsiParams::new(14, 30.0, 70.0).unwrap());
        assert_eq!(ma.warmup_bars(), 20);
        assert_eq!(rsi.warmup_bars(), 15);
        assert_eq!(Strategy::BuyAndHold.warmup_bars(), 1);
    }

    #[test]
    fn strategy_display() {
        let ma = Strategy::MovingAverageCrossover(MaCrossoverParams::default());
        assert_eq!(ma.to_string(), "Moving Average Crossover (50/200)");
        assert_eq!(
            Strategy::RsiThreshold(RsiParams::default()).to_string(),
            "RSI Threshold (14, 30/70)"
        );
        assert_eq!(Strategy::BuyAndHold.to_string(), "Buy and Hold");
        assert_eq!(ma.kind(), StrategyKind::MovingAverageCrossover);
    }
}
