//! Path generation: seeded random streams, the GBM simulator and market
//! stress scenarios.

pub mod gbm;
pub mod rng;
pub mod scenario;
