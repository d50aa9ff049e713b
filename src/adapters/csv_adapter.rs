//! CSV file price data adapter.
//!
//! One file per ticker, `<base_path>/<TICKER>.csv`, with a header row.
//! Tickers are case-insensitive: `aapl.csv` serves `AAPL`, and listed tickers
//! are upper-cased. `date` (YYYY-MM-DD) and `close` are required; `open`,
//! `high`, `low` and `volume` are read when present. Rows come back in file
//! order; ordering is checked by `PriceSeries::new`, not fixed up here.

use crate::domain::error::BacktesterError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, BacktesterError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| BacktesterError::DataProvider {
                reason: format!("missing {} column", name),
            })
        };
        Ok(Columns {
            date: required("date")?,
            close: required("close")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<TICKER>.csv` if present, otherwise any `.csv` whose stem matches
    /// the ticker ignoring ASCII case.
    fn csv_path(&self, ticker: &str) -> PathBuf {
        let canonical = self.base_path.join(format!("{}.csv", ticker.to_uppercase()));
        if canonical.exists() {
            return canonical;
        }
        fs::read_dir(&self.base_path)
            .into_iter()
            .flatten()
            .flatten()
            .map(|entry| entry.path())
            .find(|path| {
                path.extension().is_some_and(|ext| ext == "csv")
                    && path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .is_some_and(|stem| stem.eq_ignore_ascii_case(ticker))
            })
            .unwrap_or(canonical)
    }

    fn read_all(&self, ticker: &str) -> Result<Vec<PricePoint>, BacktesterError> {
        let path = self.csv_path(ticker);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| BacktesterError::DataProvider {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr.headers().map_err(|e| BacktesterError::DataProvider {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BacktesterError::DataProvider {
                reason: format!("CSV parse error: {}", e),
            })?;
            points.push(parse_record(&record, &columns)?);
        }
        Ok(points)
    }
}

fn parse_record(record: &csv::StringRecord, columns: &Columns) -> Result<PricePoint, BacktesterError> {
    let date_str = record.get(columns.date).unwrap_or_default().trim();
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        BacktesterError::DataProvider {
            reason: format!("invalid date '{}': {}", date_str, e),
        }
    })?;

    let close = parse_field::<f64>(record, Some(columns.close), "close")?.ok_or_else(|| {
        BacktesterError::DataProvider {
            reason: format!("missing close value on {}", date),
        }
    })?;

    Ok(PricePoint {
        date,
        open: parse_field(record, columns.open, "open")?,
        high: parse_field(record, columns.high, "high")?,
        low: parse_field(record, columns.low, "low")?,
        close,
        volume: parse_field(record, columns.volume, "volume")?,
    })
}

/// `None` when the column is absent or the cell is empty.
fn parse_field<T>(
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
) -> Result<Option<T>, BacktesterError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = column.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| BacktesterError::DataProvider {
            reason: format!("invalid {} value '{}': {}", name, raw, e),
        })
}

impl PriceDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, BacktesterError> {
        let points: Vec<PricePoint> = self
            .read_all(ticker)?
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();

        if points.is_empty() {
            return Err(BacktesterError::NoData {
                ticker: ticker.to_uppercase(),
            });
        }
        Ok(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, BacktesterError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BacktesterError::DataProvider {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BacktesterError::DataProvider {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            if let Some(ticker) = name.to_string_lossy().strip_suffix(".csv") {
                tickers.push(ticker.to_uppercase());
            }
        }

        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BacktesterError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        let points = self.read_all(ticker)?;
        let first = points.iter().map(|p| p.date).min();
        let last = points.iter().map(|p| p.date).max();
        Ok(first.zip(last).map(|(first, last)| (first, last, points.len())))
    }
}
