mod common;

use backtester::domain::backtest::{BacktestConfig, run_backtest};
use backtester::domain::indicator::{rolling_mean, rsi};
use backtester::domain::portfolio::run_simulation;
use backtester::domain::signal::{PositionChange, SignalRecord};
use backtester::domain::strategy::{MaCrossoverParams, RsiParams, Strategy};
use common::*;
use proptest::prelude::*;

fn config(initial_capital: f64) -> BacktestConfig {
    BacktestConfig {
        initial_capital,
        ..sample_config()
    }
}

fn expected_change(previous: i8, current: i8) -> PositionChange {
    match current - previous {
        1 => PositionChange::Buy,
        -1 => PositionChange::Sell,
        _ => PositionChange::Hold,
    }
}

fn assert_changes_follow_signal(records: &[SignalRecord]) -> Result<(), TestCaseError> {
    prop_assert_eq!(records[0].position_change, PositionChange::Hold);
    for pair in records.windows(2) {
        prop_assert_eq!(
            pair[1].position_change,
            expected_change(pair[0].signal, pair[1].signal)
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn rolling_mean_never_backfills(
        closes in prop::collection::vec(0.01f64..10_000.0, 1..40),
        extra in 1usize..10,
    ) {
        let window = closes.len() + extra;
        let prices = series(&closes);
        let ma = rolling_mean(prices.points(), window).unwrap();

        prop_assert_eq!(ma.len(), closes.len());
        prop_assert_eq!(ma.defined_count(), 0);
    }

    #[test]
    fn rolling_mean_ignores_future_prices(
        closes in prop::collection::vec(0.01f64..10_000.0, 2..60),
        window in 1usize..10,
        cut in 1usize..60,
    ) {
        let cut = cut.min(closes.len());
        let full = rolling_mean(series(&closes).points(), window).unwrap();
        let prefix = rolling_mean(series(&closes[..cut]).points(), window).unwrap();

        for i in 0..cut {
            prop_assert_eq!(full.value_at(i), prefix.value_at(i));
            prop_assert_eq!(full.value_at(i).is_some(), i + 1 >= window);
        }
    }

    #[test]
    fn rsi_is_100_without_losses(
        start in 1.0f64..500.0,
        steps in prop::collection::vec(0.01f64..25.0, 1..50),
        period in 1usize..15,
    ) {
        let mut closes = vec![start];
        for step in &steps {
            let next = closes[closes.len() - 1] + step;
            closes.push(next);
        }

        let values = rsi(series(&closes).points(), period).unwrap();
        for i in 0..values.len() {
            match values.value_at(i) {
                Some(v) => prop_assert_eq!(v, 100.0),
                None => prop_assert!(i < period),
            }
        }
    }

    #[test]
    fn ma_crossover_trades_only_on_transitions(
        closes in prop::collection::vec(1.0f64..500.0, 20..120),
        short in 1usize..6,
        gap in 1usize..12,
    ) {
        let strategy = Strategy::MovingAverageCrossover(
            MaCrossoverParams::new(short, short + gap).unwrap(),
        );
        let signals = strategy.generate_signals(&series(&closes)).unwrap();

        prop_assert!(signals.records.iter().all(|r| r.signal == 0 || r.signal == 1));
        assert_changes_follow_signal(&signals.records)?;
    }

    #[test]
    fn rsi_jumps_of_two_collapse_to_hold(
        closes in prop::collection::vec(1.0f64..500.0, 20..120),
        period in 1usize..10,
        oversold in 5.0f64..45.0,
        overbought in 55.0f64..95.0,
    ) {
        let strategy = Strategy::RsiThreshold(RsiParams::new(period, oversold, overbought).unwrap());
        let signals = strategy.generate_signals(&series(&closes)).unwrap();

        assert_changes_follow_signal(&signals.records)?;
        for pair in signals.records.windows(2) {
            if (pair[1].signal - pair[0].signal).abs() == 2 {
                prop_assert_eq!(pair[1].position_change, PositionChange::Hold);
            }
        }
    }

    #[test]
    fn simulation_is_deterministic_and_solvent(
        closes in prop::collection::vec(1.0f64..500.0, 20..120),
        short in 1usize..6,
        gap in 1usize..12,
        initial_capital in 1.0f64..100_000.0,
    ) {
        let strategy = Strategy::MovingAverageCrossover(
            MaCrossoverParams::new(short, short + gap).unwrap(),
        );
        let signals = strategy.generate_signals(&series(&closes)).unwrap();

        let first = run_simulation(&signals.records, initial_capital).unwrap();
        let second = run_simulation(&signals.records, initial_capital).unwrap();
        prop_assert_eq!(&first, &second);

        // cash held while flat, before the next opening buy
        let mut cash_before_buy = initial_capital;
        for record in &first {
            prop_assert!(record.total >= 0.0);
            prop_assert!(record.cash >= 0.0);
            if let Some(fill) = record.fill {
                if fill.side == PositionChange::Buy {
                    prop_assert!(record.cash < cash_before_buy);
                }
            }
            if record.shares_held == 0 {
                cash_before_buy = record.cash;
            }
        }
    }

    #[test]
    fn buy_and_hold_deploys_capital(
        closes in prop::collection::vec(0.5f64..2_000.0, 1..80),
        initial_capital in 1.0f64..50_000.0,
    ) {
        let result = run_backtest(&series(&closes), &Strategy::BuyAndHold, &config(initial_capital))
            .unwrap();

        for record in &result.portfolio {
            prop_assert!(record.total >= 0.0);
            if record.shares_held > 0 {
                prop_assert!(record.cash < initial_capital);
            }
        }
        // whole shares only: the leftover cannot buy another one
        let first = &result.portfolio[0];
        prop_assert!(first.cash >= 0.0);
        prop_assert!(first.cash < closes[0]);
    }
}
