//! Core domain types and logic.

pub mod amount;
pub mod backtest;
pub mod drip;
pub mod error;
pub mod fx;
pub mod market_data;
pub mod position;
pub mod settings;
