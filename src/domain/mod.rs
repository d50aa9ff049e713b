//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod strategy;
pub mod portfolio;
pub mod metrics;
pub mod backtest;
pub mod sweep;
pub mod config_validation;
pub mod error;
