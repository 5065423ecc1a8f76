//! # autocall-pricer
//!
//! Monte Carlo pricing engine for barrier-observation autocallable notes.
//!
//! The underlying follows geometric Brownian motion. Each simulated path is
//! scored by a payoff rule, the payoffs are averaged and discounted, and the
//! result is reported together with its sampling diagnostics. A Black-Scholes
//! call struck at the protection level is available as an approximate
//! benchmark.
//!
//! ## Architecture
//!
//! - **core** — Configuration, price paths, outcomes and errors
//! - **simulation** — GBM path generation, per-path random streams, market scenarios
//! - **pricing** — Payoff rules, discounting, closed-form benchmark, the pricing engine
//! - **market** — Historical volatility estimation

pub mod core;
pub mod market;
pub mod pricing;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::config::{PayoffPolicy, SimulationConfig, SimulationParams};
    pub use crate::core::error::PricingError;
    pub use crate::core::path::PricePath;
    pub use crate::core::result::{PayoffOutcome, PricingMethod, PricingResult};
    pub use crate::pricing::engine::{PricingEngine, PricingRequest, ScenarioReport};
    pub use crate::pricing::payoff::{AnyCrossingWithFloor, FirstTouchObservation, PayoffEvaluator};
    pub use crate::simulation::gbm::Execution;
    pub use crate::simulation::scenario::Scenario;
}
