//! Configuration validation and strategy option parsing.
//!
//! The `[strategy]` section is the strategy's named-option bag. Unrecognized
//! keys are ignored. A missing required option is an error unless the caller
//! opts into the documented defaults (`use_defaults = true`).

use std::str::FromStr;

use crate::domain::backtest::DEFAULT_INITIAL_CAPITAL;
use crate::domain::error::BacktesterError;
use crate::domain::strategy::{
    DEFAULT_LONG_WINDOW, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD, DEFAULT_RSI_PERIOD,
    DEFAULT_SHORT_WINDOW, MaCrossoverParams, RsiParams, Strategy, StrategyKind,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const BACKTEST_SECTION: &str = "backtest";
pub const STRATEGY_SECTION: &str = "strategy";

/// Capital and evaluation period. The ticker may come from the command line,
/// so it is resolved when the run config is built.
pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BacktesterError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BacktesterError> {
    strategy_from_config(config).map(|_| ())
}

/// Build the strategy from the `[strategy]` section, honouring its `use_defaults` flag.
pub fn strategy_from_config(config: &dyn ConfigPort) -> Result<Strategy, BacktesterError> {
    let use_defaults = config.get_bool(STRATEGY_SECTION, "use_defaults", false);
    strategy_from_options(config, use_defaults)
}

pub fn strategy_from_options(
    options: &dyn ConfigPort,
    use_defaults: bool,
) -> Result<Strategy, BacktesterError> {
    let kind: StrategyKind = read_option(
        options,
        "kind",
        StrategyKind::MovingAverageCrossover,
        use_defaults,
    )?;

    let strategy = match kind {
        StrategyKind::MovingAverageCrossover => {
            let short_window = read_option(options, "short_window", DEFAULT_SHORT_WINDOW, use_defaults)?;
            let long_window = read_option(options, "long_window", DEFAULT_LONG_WINDOW, use_defaults)?;
            Strategy::MovingAverageCrossover(MaCrossoverParams::new(short_window, long_window)?)
        }
        StrategyKind::RsiThreshold => {
            let period = read_option(options, "rsi_period", DEFAULT_RSI_PERIOD, use_defaults)?;
            let oversold = read_option(options, "oversold", DEFAULT_OVERSOLD, use_defaults)?;
            let overbought = read_option(options, "overbought", DEFAULT_OVERBOUGHT, use_defaults)?;
            Strategy::RsiThreshold(RsiParams::new(period, oversold, overbought)?)
        }
        StrategyKind::BuyAndHold => Strategy::BuyAndHold,
    };
    Ok(strategy)
}

fn read_option<T: FromStr>(
    options: &dyn ConfigPort,
    key: &str,
    default: T,
    use_defaults: bool,
) -> Result<T, BacktesterError> {
    match options.get_string(STRATEGY_SECTION, key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|_| {
            BacktesterError::invalid_parameter(key, format!("cannot parse '{}'", raw.trim()))
        }),
        _ if use_defaults => Ok(default),
        _ => Err(BacktesterError::invalid_parameter(
            key,
            "missing required option",
        )),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), BacktesterError> {
    read_initial_capital(config).map(|_| ())
}

/// `initial_capital` from `[backtest]`. Only an absent or blank key falls back
/// to the default; a value that does not parse is rejected.
pub fn read_initial_capital(config: &dyn ConfigPort) -> Result<f64, BacktesterError> {
    let invalid = |reason: String| BacktesterError::ConfigInvalid {
        section: BACKTEST_SECTION.to_string(),
        key: "initial_capital".to_string(),
        reason,
    };

    let value = match config.get_string(BACKTEST_SECTION, "initial_capital") {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{}' is not a number", raw.trim())))?,
        _ => DEFAULT_INITIAL_CAPITAL,
    };

    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("initial_capital must be positive".to_string()));
    }
    Ok(value)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktesterError> {
    let start_str = config.get_string(BACKTEST_SECTION, "start_date");
    let end_str = config.get_string(BACKTEST_SECTION, "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(BacktesterError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, BacktesterError> {
    match value {
        None => Err(BacktesterError::ConfigMissing {
            section: BACKTEST_SECTION.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            BacktesterError::ConfigInvalid {
                section: BACKTEST_SECTION.to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}
