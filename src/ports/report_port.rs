//! Report generation port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::BacktesterError;
use std::path::Path;

/// Port for handing backtest output to a presentation layer.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_path: &Path,
    ) -> Result<(), BacktesterError>;
}
