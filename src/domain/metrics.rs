//! Performance summary of a simulated portfolio.

use chrono::NaiveDate;

use super::error::BacktesterError;
use super::portfolio::PortfolioRecord;

pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
}

impl PerformanceSummary {
    /// Summarize a run over the calendar period `start..end`.
    pub fn compute(
        records: &[PortfolioRecord],
        initial_capital: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, BacktesterError> {
        let final_value = records
            .last()
            .map(|r| r.total)
            .ok_or(BacktesterError::InsufficientData {
                bars: 0,
                minimum: 1,
            })?;

        let total_return = total_return(final_value, initial_capital)?;
        let annualized_return = cagr(total_return, elapsed_years(start, end))?;

        Ok(PerformanceSummary {
            initial_capital,
            final_value,
            total_return,
            annualized_return,
            max_drawdown: max_drawdown(records),
            trade_count: records.iter().filter(|r| r.fill.is_some()).count(),
        })
    }
}

/// `(final - initial) / initial`
pub fn total_return(final_value: f64, initial_capital: f64) -> Result<f64, BacktesterError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(BacktesterError::invalid_parameter(
            "initial_capital",
            format!("must be positive, got {}", initial_capital),
        ));
    }
    Ok((final_value - initial_capital) / initial_capital)
}

/// Compound annual growth rate: `(1 + total_return)^(1 / years) - 1`.
pub fn cagr(total_return: f64, years: f64) -> Result<f64, BacktesterError> {
    if years == 0.0 {
        return Err(BacktesterError::ZeroLengthPeriod);
    }
    if !years.is_finite() || years < 0.0 {
        return Err(BacktesterError::invalid_parameter(
            "years",
            format!("must be positive, got {}", years),
        ));
    }
    Ok((1.0 + total_return).powf(1.0 / years) - 1.0)
}

/// Calendar years between two dates, using 365.25 days per year.
pub fn elapsed_years(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Largest peak-to-trough fall of the portfolio total, as a fraction of the peak.
pub fn max_drawdown(records: &[PortfolioRecord]) -> f64 {
    let Some(first) = records.first() else {
        return 0.0;
    };

    let mut peak = first.total;
    let mut max_dd = 0.0_f64;

    for record in records {
        if record.total > peak {
            peak = record.total;
        } else if peak > 0.0 {
            let dd = (peak - record.total) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
