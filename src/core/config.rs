use crate::core::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contractual rule that turns a simulated path into a payoff.
///
/// The two variants are different autocall contracts, not two
/// implementations of the same one:
///
/// - `FirstTouchObservation` checks `S[t] >= barrier` on observation dates
///   only and pays a price-scaled coupon `coupon * S[t]` on the first hit.
/// - `AnyCrossingWithFloor` checks every simulated step for `S[t] > barrier`
///   and pays a fixed coupon, otherwise `max(S[T], protection)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PayoffPolicy {
    FirstTouchObservation,
    AnyCrossingWithFloor,
}

impl PayoffPolicy {
    pub const ALL: [PayoffPolicy; 2] = [
        PayoffPolicy::FirstTouchObservation,
        PayoffPolicy::AnyCrossingWithFloor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffPolicy::FirstTouchObservation => "FirstTouchObservation",
            PayoffPolicy::AnyCrossingWithFloor => "AnyCrossingWithFloor",
        }
    }
}

impl fmt::Display for PayoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffPolicy {
    type Err = PricingError;

    /// Accepts the variant name in any case, with or without separators
    /// (`first-touch`, `any_crossing_with_floor`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "firsttouchobservation" | "firsttouch" => Ok(PayoffPolicy::FirstTouchObservation),
            "anycrossingwithfloor" | "anycrossing" => Ok(PayoffPolicy::AnyCrossingWithFloor),
            _ => Err(PricingError::unsupported("payoff policy", s)),
        }
    }
}

impl TryFrom<String> for PayoffPolicy {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayoffPolicy> for String {
    fn from(policy: PayoffPolicy) -> Self {
        policy.as_str().to_string()
    }
}

/// Lowercase and strip `-`, `_` and spaces so enum names parse loosely.
pub(crate) fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raw, unvalidated pricing parameters.
///
/// Every field is public and independently overridable; this is what
/// callers, JSON files and CLI flags manipulate. It only becomes usable by
/// the engine once turned into a [`SimulationConfig`].
///
/// Defaults reproduce the reference pricing screen: spot 100, drift 5%,
/// volatility 20%, one year of daily steps, 10 000 paths, barrier 110,
/// coupon 5, protection 80.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Initial price of the underlying (`S0`).
    pub spot: f64,
    /// Drift of the simulated GBM. Equal to the discount rate for
    /// risk-neutral valuation.
    pub drift_rate: f64,
    /// Rate used to discount the expected payoff. `None` means "same as
    /// `drift_rate`".
    pub discount_rate: Option<f64>,
    /// Annualized volatility (`sigma`).
    pub volatility: f64,
    /// Maturity in years (`T`).
    pub maturity: f64,
    /// Time steps per path, at most [`MAX_STEPS_PER_PATH`].
    pub steps_per_path: usize,
    /// Number of Monte Carlo paths, at most [`MAX_SIMULATIONS`].
    pub num_simulations: usize,
    /// Autocall barrier. Inclusive on observation dates for
    /// `FirstTouchObservation`, strict on every step for
    /// `AnyCrossingWithFloor`.
    pub barrier_level: f64,
    /// A rate on the prevailing price for `FirstTouchObservation`, a cash
    /// amount for `AnyCrossingWithFloor`.
    pub coupon_amount: f64,
    /// Floor on the maturity payoff of `AnyCrossingWithFloor`; strike of
    /// the closed-form benchmark.
    pub protection_level: f64,
    pub payoff_policy: PayoffPolicy,
    /// Observation dates for `FirstTouchObservation` fall on every
    /// `observation_interval`-th simulated step.
    pub observation_interval: usize,
}

/// Upper bound on `steps_per_path`.
pub const MAX_STEPS_PER_PATH: usize = 1_000_000;

/// Upper bound on `num_simulations`.
pub const MAX_SIMULATIONS: usize = 10_000_000;

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            spot: 100.0,
            drift_rate: 0.05,
            discount_rate: None,
            volatility: 0.20,
            maturity: 1.0,
            steps_per_path: 252,
            num_simulations: 10_000,
            barrier_level: 110.0,
            coupon_amount: 5.0,
            protection_level: 80.0,
            payoff_policy: PayoffPolicy::AnyCrossingWithFloor,
            observation_interval: 1,
        }
    }
}

impl SimulationParams {
    /// Check every field against its domain.
    ///
    /// Returns the first violation found, in declaration order.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricingError::invalid("spot", self.spot, "must be finite and > 0"));
        }
        if !self.drift_rate.is_finite() {
            return Err(PricingError::invalid("drift_rate", self.drift_rate, "must be finite"));
        }
        if let Some(rate) = self.discount_rate {
            if !rate.is_finite() {
                return Err(PricingError::invalid("discount_rate", rate, "must be finite"));
            }
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(PricingError::invalid(
                "volatility",
                self.volatility,
                "must be finite and >= 0",
            ));
        }
        if !self.maturity.is_finite() || self.maturity <= 0.0 {
            return Err(PricingError::invalid("maturity", self.maturity, "must be finite and > 0"));
        }
        if self.steps_per_path < 1 || self.steps_per_path > MAX_STEPS_PER_PATH {
            return Err(PricingError::invalid(
                "steps_per_path",
                self.steps_per_path,
                "must be in 1..=1_000_000",
            ));
        }
        if self.num_simulations < 1 || self.num_simulations > MAX_SIMULATIONS {
            return Err(PricingError::invalid(
                "num_simulations",
                self.num_simulations,
                "must be in 1..=10_000_000",
            ));
        }
        if !self.barrier_level.is_finite() || self.barrier_level <= 0.0 {
            return Err(PricingError::invalid(
                "barrier_level",
                self.barrier_level,
                "must be finite and > 0",
            ));
        }
        if !self.coupon_amount.is_finite() || self.coupon_amount < 0.0 {
            return Err(PricingError::invalid(
                "coupon_amount",
                self.coupon_amount,
                "must be finite and >= 0",
            ));
        }
        if !self.protection_level.is_finite() || self.protection_level < 0.0 {
            return Err(PricingError::invalid(
                "protection_level",
                self.protection_level,
                "must be finite and >= 0",
            ));
        }
        if self.observation_interval < 1 || self.observation_interval > self.steps_per_path {
            return Err(PricingError::invalid(
                "observation_interval",
                self.observation_interval,
                "must be in 1..=steps_per_path",
            ));
        }
        Ok(())
    }
}

/// Validated, immutable pricing configuration.
///
/// The only way to obtain one is through [`SimulationConfig::new`] (or
/// deserialization, which goes through the same checks), so holding a
/// `SimulationConfig` proves the invariants `S0 > 0`, `sigma >= 0`, `T > 0`,
/// `steps_per_path >= 1` and `num_simulations >= 1`.
///
/// # Examples
///
/// ```
/// use autocall_pricer::core::config::{SimulationConfig, SimulationParams};
///
/// let config = SimulationConfig::new(SimulationParams {
///     num_simulations: 500,
///     ..Default::default()
/// })
/// .unwrap();
/// assert_eq!(config.num_simulations(), 500);
///
/// let bad = SimulationConfig::new(SimulationParams {
///     maturity: 0.0,
///     ..Default::default()
/// });
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SimulationParams", into = "SimulationParams")]
pub struct SimulationConfig {
    params: SimulationParams,
}

impl SimulationConfig {
    /// Validate `params` and freeze them.
    pub fn new(params: SimulationParams) -> Result<Self, PricingError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// A copy of the underlying parameters, for deriving a modified config.
    pub fn to_params(&self) -> SimulationParams {
        self.params.clone()
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    // --- Accessors ---

    pub fn spot(&self) -> f64 {
        self.params.spot
    }

    pub fn drift_rate(&self) -> f64 {
        self.params.drift_rate
    }

    /// The rate the expected payoff is discounted at (`r`).
    pub fn discount_rate(&self) -> f64 {
        self.params.discount_rate.unwrap_or(self.params.drift_rate)
    }

    pub fn volatility(&self) -> f64 {
        self.params.volatility
    }

    pub fn maturity(&self) -> f64 {
        self.params.maturity
    }

    pub fn steps_per_path(&self) -> usize {
        self.params.steps_per_path
    }

    pub fn num_simulations(&self) -> usize {
        self.params.num_simulations
    }

    pub fn barrier_level(&self) -> f64 {
        self.params.barrier_level
    }

    pub fn coupon_amount(&self) -> f64 {
        self.params.coupon_amount
    }

    pub fn protection_level(&self) -> f64 {
        self.params.protection_level
    }

    pub fn payoff_policy(&self) -> PayoffPolicy {
        self.params.payoff_policy
    }

    pub fn observation_interval(&self) -> usize {
        self.params.observation_interval
    }

    // --- Derived quantities ---

    /// Length of one simulation step in years.
    pub fn dt(&self) -> f64 {
        self.params.maturity / self.params.steps_per_path as f64
    }

    /// Whether the simulated drift equals the discount rate.
    ///
    /// When it does not, the Monte Carlo price is not a risk-neutral value;
    /// the engine still prices but reports a warning.
    pub fn is_risk_neutral(&self) -> bool {
        self.params.drift_rate == self.discount_rate()
    }

    /// Whether simulated step `step` is an observation date. Step 0 (the
    /// initial fixing) never is.
    pub fn is_observation_step(&self, step: usize) -> bool {
        step >= 1 && step % self.params.observation_interval == 0
    }
}

impl TryFrom<SimulationParams> for SimulationConfig {
    type Error = PricingError;

    fn try_from(params: SimulationParams) -> Result<Self, Self::Error> {
        SimulationConfig::new(params)
    }
}

impl From<SimulationConfig> for SimulationParams {
    fn from(config: SimulationConfig) -> Self {
        config.params
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams::default()
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(params().validate().is_ok());
        let config = SimulationConfig::default();
        assert_eq!(config.steps_per_path(), 252);
        assert_eq!(config.payoff_policy(), PayoffPolicy::AnyCrossingWithFloor);
    }

    #[test]
    fn test_rejects_zero_simulations() {
        let err = SimulationConfig::new(SimulationParams {
            num_simulations: 0,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "num_simulations", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_maturity() {
        let err = SimulationConfig::new(SimulationParams {
            maturity: 0.0,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "maturity", .. }
        ));
    }

    #[test]
    fn test_rejects_negative_volatility() {
        let err = SimulationConfig::new(SimulationParams {
            volatility: -0.1,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "volatility", .. }
        ));
    }

    #[test]
    fn test_rejects_non_positive_spot_and_steps() {
        assert!(SimulationConfig::new(SimulationParams { spot: 0.0, ..params() }).is_err());
        assert!(SimulationConfig::new(SimulationParams { spot: -5.0, ..params() }).is_err());
        assert!(SimulationConfig::new(SimulationParams {
            steps_per_path: 0,
            ..params()
        })
        .is_err());
    }

    #[test]
    fn test_rejects_oversized_runs() {
        let err = SimulationConfig::new(SimulationParams {
            steps_per_path: MAX_STEPS_PER_PATH + 1,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "steps_per_path", .. }
        ));

        let err = SimulationConfig::new(SimulationParams {
            steps_per_path: 1 << 40,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "steps_per_path", .. }
        ));

        let err = SimulationConfig::new(SimulationParams {
            num_simulations: MAX_SIMULATIONS + 1,
            ..params()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "num_simulations", .. }
        ));

        assert!(SimulationConfig::new(SimulationParams {
            steps_per_path: MAX_STEPS_PER_PATH,
            num_simulations: MAX_SIMULATIONS,
            ..params()
        })
        .is_ok());
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        assert!(SimulationConfig::new(SimulationParams {
            drift_rate: f64::NAN,
            ..params()
        })
        .is_err());
        assert!(SimulationConfig::new(SimulationParams {
            discount_rate: Some(f64::INFINITY),
            ..params()
        })
        .is_err());
    }

    #[test]
    fn test_observation_interval_bounds() {
        assert!(SimulationConfig::new(SimulationParams {
            observation_interval: 0,
            ..params()
        })
        .is_err());
        assert!(SimulationConfig::new(SimulationParams {
            steps_per_path: 12,
            observation_interval: 13,
            ..params()
        })
        .is_err());

        let config = SimulationConfig::new(SimulationParams {
            steps_per_path: 12,
            observation_interval: 3,
            ..params()
        })
        .unwrap();
        assert!(!config.is_observation_step(0));
        assert!(!config.is_observation_step(2));
        assert!(config.is_observation_step(3));
        assert!(config.is_observation_step(12));
    }

    #[test]
    fn test_discount_rate_defaults_to_drift() {
        let config = SimulationConfig::default();
        assert_eq!(config.discount_rate(), config.drift_rate());
        assert!(config.is_risk_neutral());

        let decoupled = SimulationConfig::new(SimulationParams {
            drift_rate: 0.08,
            discount_rate: Some(0.02),
            ..params()
        })
        .unwrap();
        assert_eq!(decoupled.discount_rate(), 0.02);
        assert!(!decoupled.is_risk_neutral());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "first-touch".parse::<PayoffPolicy>().unwrap(),
            PayoffPolicy::FirstTouchObservation
        );
        assert_eq!(
            "AnyCrossingWithFloor".parse::<PayoffPolicy>().unwrap(),
            PayoffPolicy::AnyCrossingWithFloor
        );
        let err = "knock-out".parse::<PayoffPolicy>().unwrap_err();
        assert!(matches!(err, PricingError::UnsupportedMethod { kind: "payoff policy", .. }));
    }

    #[test]
    fn test_config_json_rejects_invalid_values() {
        let json = r#"{ "spot": 100.0, "volatility": -0.1 }"#;
        let result: Result<SimulationConfig, _> = serde_json::from_str(json);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("volatility"));
    }

    #[test]
    fn test_config_json_partial_override() {
        let json = r#"{ "spot": 120.0, "payoff_policy": "first-touch" }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.spot(), 120.0);
        assert_eq!(config.payoff_policy(), PayoffPolicy::FirstTouchObservation);
        assert_eq!(config.num_simulations(), 10_000);
    }
}
