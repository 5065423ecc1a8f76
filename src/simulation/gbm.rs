//! Geometric Brownian motion path generation.
//!
//! Uses the exact log-normal step
//!
//! ```text
//! S[t] = S[t-1] * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * Z)
//! ```
//!
//! with a fresh `Z ~ N(0, 1)` for every (path, step) pair.

use crate::core::config::{PayoffPolicy, SimulationConfig};
use crate::core::error::PricingError;
use crate::core::path::PricePath;
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How much of each path to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Stop at the first observation step where `S[t] >= barrier`.
    /// Equivalent to generating the full path and truncating it there.
    EarlyExit,
    /// Always generate `steps_per_path` steps.
    FullPath,
}

impl GenerationMode {
    /// The cheapest mode that still gives `policy` everything it reads.
    pub fn for_policy(policy: PayoffPolicy) -> Self {
        match policy {
            PayoffPolicy::FirstTouchObservation => GenerationMode::EarlyExit,
            PayoffPolicy::AnyCrossingWithFloor => GenerationMode::FullPath,
        }
    }
}

/// Whether independent paths are spread over the rayon pool.
///
/// Both modes produce identical results for the same seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    #[default]
    Parallel,
    Sequential,
}

/// Run `f` for every path index in `0..n` and collect the results in index
/// order. The first error aborts the batch.
pub(crate) fn map_paths<T, F>(n: usize, execution: Execution, f: F) -> Result<Vec<T>, PricingError>
where
    T: Send,
    F: Fn(usize) -> Result<T, PricingError> + Send + Sync,
{
    match execution {
        Execution::Parallel => (0..n).into_par_iter().map(f).collect(),
        Execution::Sequential => (0..n).map(f).collect(),
    }
}

/// Generates GBM paths for one validated configuration.
#[derive(Debug, Clone)]
pub struct PathSimulator<'a> {
    config: &'a SimulationConfig,
    /// `(mu - sigma^2 / 2) * dt`
    log_drift: f64,
    /// `sigma * sqrt(dt)`
    diffusion: f64,
}

impl<'a> PathSimulator<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        let dt = config.dt();
        let sigma = config.volatility();
        Self {
            config,
            log_drift: (config.drift_rate() - 0.5 * sigma * sigma) * dt,
            diffusion: sigma * dt.sqrt(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        self.config
    }

    /// Advance one step from `price` with the standard normal draw `z`.
    #[inline]
    pub fn step(&self, price: f64, z: f64) -> f64 {
        price * (self.log_drift + self.diffusion * z).exp()
    }

    /// Generate a single path, drawing normals from `rng`.
    ///
    /// `path_index` is only used to locate the failure in a
    /// `NumericalInstability` error.
    pub fn simulate_path<R: Rng + ?Sized>(
        &self,
        path_index: usize,
        rng: &mut R,
        mode: GenerationMode,
    ) -> Result<PricePath, PricingError> {
        let steps = self.config.steps_per_path();
        let barrier = self.config.barrier_level();

        // Early-exit paths usually stop well before maturity.
        let capacity = match mode {
            GenerationMode::FullPath => steps + 1,
            GenerationMode::EarlyExit => self.config.observation_interval() + 1,
        };
        let mut prices = Vec::with_capacity(capacity);
        let mut current = self.config.spot();
        prices.push(current);

        for t in 1..=steps {
            let z: f64 = rng.sample(StandardNormal);
            current = self.step(current, z);
            if !current.is_finite() {
                return Err(PricingError::unstable(
                    format!("simulated price (path {}, step {})", path_index, t),
                    current,
                ));
            }
            prices.push(current);

            if mode == GenerationMode::EarlyExit
                && self.config.is_observation_step(t)
                && current >= barrier
            {
                break;
            }
        }

        Ok(PricePath::new(prices))
    }
}
