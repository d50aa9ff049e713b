#![allow(dead_code)]

use backtester::domain::backtest::BacktestConfig;
use backtester::domain::error::BacktesterError;
pub use backtester::domain::price::{PricePoint, PriceSeries};
use backtester::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    /// Points are returned in stored order so ordering faults reach the domain.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, BacktesterError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(BacktesterError::DataProvider {
                reason: reason.clone(),
            });
        }
        let points: Vec<PricePoint> = self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if points.is_empty() {
            return Err(BacktesterError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, BacktesterError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BacktesterError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(BacktesterError::DataProvider {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(date: &str, close: f64) -> PricePoint {
    PricePoint::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), close)
}

/// One point per calendar day starting at `start_date`.
pub fn points_from_closes(start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(points_from_closes("2024-01-01", closes)).unwrap()
}

/// Linear ramp from `start_price`, one unit per day.
pub fn generate_points(start_date: &str, count: usize, start_price: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    points_from_closes(start_date, &closes)
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        ticker: "TEST".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        initial_capital: 10_000.0,
    }
}
