//! Autocall payoff rules.
//!
//! Two contract structures coexist and are deliberately kept apart:
//!
//! | | [`FirstTouchObservation`] | [`AnyCrossingWithFloor`] |
//! |---|---|---|
//! | barrier check | `S[t] >= B` on observation dates | `S[t] > B` on every step, `S0` included |
//! | redemption payoff | `coupon * S[t]` (price-scaled) | `coupon` (fixed) |
//! | no redemption | `0` | `max(S[T], protection)` |

use crate::core::config::{PayoffPolicy, SimulationConfig};
use crate::core::path::PricePath;
use crate::core::result::PayoffOutcome;
use crate::simulation::gbm::GenerationMode;
use serde::{Deserialize, Serialize};

/// Turns one simulated path into one payoff.
pub trait PayoffEvaluator: Send + Sync {
    fn policy(&self) -> PayoffPolicy;

    fn evaluate(&self, path: &PricePath) -> PayoffOutcome;

    /// Path generation mode this evaluator needs.
    fn generation_mode(&self) -> GenerationMode {
        GenerationMode::for_policy(self.policy())
    }
}

/// Discrete-observation autocall with a price-scaled coupon.
///
/// On the first observation step `t` with `S[t] >= barrier_level` the note
/// redeems and pays `coupon_amount * S[t]`. A note that is never called pays
/// nothing. The coupon is therefore a rate applied to the prevailing price,
/// not a cash amount.
///
/// # Examples
///
/// ```
/// use autocall_pricer::core::path::PricePath;
/// use autocall_pricer::pricing::payoff::{FirstTouchObservation, PayoffEvaluator};
///
/// let rule = FirstTouchObservation::new(110.0, 0.05, 1);
/// let outcome = rule.evaluate(&PricePath::new(vec![100.0, 105.0, 112.0, 130.0]));
/// assert_eq!(outcome.redemption_step, Some(2));
/// assert!((outcome.payoff - 0.05 * 112.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstTouchObservation {
    pub barrier_level: f64,
    pub coupon_amount: f64,
    pub observation_interval: usize,
}

impl FirstTouchObservation {
    /// # Panics
    ///
    /// Panics if `observation_interval` is zero.
    pub fn new(barrier_level: f64, coupon_amount: f64, observation_interval: usize) -> Self {
        assert!(observation_interval >= 1, "observation_interval must be at least 1");
        Self {
            barrier_level,
            coupon_amount,
            observation_interval,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.barrier_level(),
            config.coupon_amount(),
            config.observation_interval(),
        )
    }
}

impl PayoffEvaluator for FirstTouchObservation {
    fn policy(&self) -> PayoffPolicy {
        PayoffPolicy::FirstTouchObservation
    }

    fn evaluate(&self, path: &PricePath) -> PayoffOutcome {
        path.simulated_steps()
            .find(|(t, price)| t % self.observation_interval == 0 && *price >= self.barrier_level)
            .map(|(t, price)| PayoffOutcome::redeemed(self.coupon_amount * price, t))
            .unwrap_or_else(|| PayoffOutcome::at_maturity(0.0))
    }
}

/// Continuously monitored autocall with a fixed coupon and a floor.
///
/// If the path strictly exceeds `barrier_level` at any point the note pays
/// `coupon_amount`; otherwise it pays the final price floored at
/// `protection_level`.
///
/// # Examples
///
/// ```
/// use autocall_pricer::core::path::PricePath;
/// use autocall_pricer::pricing::payoff::{AnyCrossingWithFloor, PayoffEvaluator};
///
/// let rule = AnyCrossingWithFloor::new(110.0, 5.0, 80.0);
/// assert_eq!(rule.evaluate(&PricePath::new(vec![100.0, 111.0, 90.0])).payoff, 5.0);
/// assert_eq!(rule.evaluate(&PricePath::new(vec![100.0, 70.0])).payoff, 80.0);
/// assert_eq!(rule.evaluate(&PricePath::new(vec![100.0, 95.0])).payoff, 95.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnyCrossingWithFloor {
    pub barrier_level: f64,
    pub coupon_amount: f64,
    pub protection_level: f64,
}

impl AnyCrossingWithFloor {
    pub fn new(barrier_level: f64, coupon_amount: f64, protection_level: f64) -> Self {
        Self {
            barrier_level,
            coupon_amount,
            protection_level,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.barrier_level(),
            config.coupon_amount(),
            config.protection_level(),
        )
    }
}

impl PayoffEvaluator for AnyCrossingWithFloor {
    fn policy(&self) -> PayoffPolicy {
        PayoffPolicy::AnyCrossingWithFloor
    }

    fn evaluate(&self, path: &PricePath) -> PayoffOutcome {
        match path.prices().iter().position(|price| *price > self.barrier_level) {
            Some(step) => PayoffOutcome::redeemed(self.coupon_amount, step),
            None => PayoffOutcome::at_maturity(path.terminal().max(self.protection_level)),
        }
    }
}

/// The payoff rule selected by a configuration's `payoff_policy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PayoffStrategy {
    FirstTouch(FirstTouchObservation),
    AnyCrossing(AnyCrossingWithFloor),
}

impl PayoffStrategy {
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.payoff_policy() {
            PayoffPolicy::FirstTouchObservation => {
                PayoffStrategy::FirstTouch(FirstTouchObservation::from_config(config))
            }
            PayoffPolicy::AnyCrossingWithFloor => {
                PayoffStrategy::AnyCrossing(AnyCrossingWithFloor::from_config(config))
            }
        }
    }
}

impl PayoffEvaluator for PayoffStrategy {
    fn policy(&self) -> PayoffPolicy {
        match self {
            PayoffStrategy::FirstTouch(rule) => rule.policy(),
            PayoffStrategy::AnyCrossing(rule) => rule.policy(),
        }
    }

    fn evaluate(&self, path: &PricePath) -> PayoffOutcome {
        match self {
            PayoffStrategy::FirstTouch(rule) => rule.evaluate(path),
            PayoffStrategy::AnyCrossing(rule) => rule.evaluate(path),
        }
    }
}
