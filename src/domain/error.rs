//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for the backtester.
#[derive(Debug, thiserror::Error)]
pub enum BacktesterError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("price dates must be strictly increasing: {date} follows {previous}")]
    UnorderedDates { previous: NaiveDate, date: NaiveDate },

    #[error("invalid close price {close} on {date}")]
    InvalidPrice { date: NaiveDate, close: f64 },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("data provider error: {reason}")]
    DataProvider { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("evaluation period has zero length")]
    ZeroLengthPeriod,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktesterError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        BacktesterError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the errors raised at the price-series boundary.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            BacktesterError::InsufficientData { .. }
                | BacktesterError::UnorderedDates { .. }
                | BacktesterError::InvalidPrice { .. }
                | BacktesterError::DataProvider { .. }
                | BacktesterError::NoData { .. }
        )
    }

    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            BacktesterError::Io(_) => 1,
            BacktesterError::ConfigParse { .. }
            | BacktesterError::ConfigMissing { .. }
            | BacktesterError::ConfigInvalid { .. } => 2,
            BacktesterError::InvalidParameter { .. } => 4,
            BacktesterError::InsufficientData { .. }
            | BacktesterError::UnorderedDates { .. }
            | BacktesterError::InvalidPrice { .. }
            | BacktesterError::DataProvider { .. }
            | BacktesterError::NoData { .. } => 5,
            BacktesterError::ZeroLengthPeriod => 6,
            BacktesterError::Report { .. } => 7,
        }
    }
}

impl From<&BacktesterError> for std::process::ExitCode {
    fn from(err: &BacktesterError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
