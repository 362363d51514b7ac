//! Collaborator port traits.

pub mod config_port;
pub mod dividend_port;
pub mod fx_port;
pub mod price_port;
