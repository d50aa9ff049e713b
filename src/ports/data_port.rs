//! Price data access port trait.

use crate::domain::error::BacktesterError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Daily prices for `ticker` within `start_date..=end_date`, in date order.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, BacktesterError>;

    fn list_tickers(&self) -> Result<Vec<String>, BacktesterError>;

    /// First date, last date and bar count of everything stored for `ticker`.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BacktesterError>;
}
