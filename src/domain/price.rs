//! Daily price points and the validated price series.

use chrono::NaiveDate;

use super::error::BacktesterError;

/// One trading day. Only `date` and `close` are required.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// An ordered, non-empty sequence of price points with strictly increasing dates.
///
/// Missing trading days are simply absent; nothing is gap-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, BacktesterError> {
        if points.is_empty() {
            return Err(BacktesterError::InsufficientData {
                bars: 0,
                minimum: 1,
            });
        }

        for point in &points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(BacktesterError::InvalidPrice {
                    date: point.date,
                    close: point.close,
                });
            }
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(BacktesterError::UnorderedDates {
                previous: pair[0].date,
                date: pair[1].date,
            });
        }

        Ok(PriceSeries { points })
    }

    /// Build a series from `(date, close)` pairs.
    pub fn from_closes(
        closes: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, BacktesterError> {
        Self::new(
            closes
                .into_iter()
                .map(|(date, close)| PricePoint::new(date, close))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }
}
