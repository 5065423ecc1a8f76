//! Market-data utilities feeding the simulation inputs.

pub mod volatility;
