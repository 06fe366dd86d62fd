//! Concrete implementations of the port traits.

pub mod console_report;
pub mod csv_market_data;
pub mod file_config_adapter;
pub mod json_report;
pub mod momentum_agent;
