//! Payoff evaluation, discounting, benchmark valuation and orchestration.

pub mod closed_form;
pub mod discount;
pub mod engine;
pub mod payoff;
