//! Port traits the domain consumes and produces through.

pub mod config_port;
pub mod data_port;
pub mod report_port;
