use crate::core::config::SimulationConfig;
use crate::core::error::PricingError;
use crate::core::path::PricePath;
use crate::core::result::{MonteCarloStats, PricingMethod, PricingResult};
use crate::pricing::closed_form::ClosedFormPricer;
use crate::pricing::discount::Discounter;
use crate::pricing::payoff::{PayoffEvaluator, PayoffStrategy};
use crate::simulation::gbm::{map_paths, Execution, PathSimulator};
use crate::simulation::rng::PathStreams;
use crate::simulation::scenario::{Scenario, ScenarioAdjuster};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Everything needed to price once.
///
/// # Examples
///
/// ```
/// use autocall_pricer::core::config::{SimulationConfig, SimulationParams};
/// use autocall_pricer::pricing::engine::{PricingEngine, PricingRequest};
///
/// let config = SimulationConfig::new(SimulationParams {
///     num_simulations: 2_000,
///     steps_per_path: 52,
///     ..Default::default()
/// })
/// .unwrap();
///
/// let request = PricingRequest::monte_carlo(config).with_seed(42);
/// let first = PricingEngine::new().price(&request).unwrap();
/// let second = PricingEngine::new().price(&request).unwrap();
/// assert_eq!(first.price, second.price);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub config: SimulationConfig,
    pub method: PricingMethod,
    /// Master seed for the Monte Carlo streams. Drawn from OS entropy (and
    /// reported back) when absent.
    pub seed: Option<u64>,
    /// Stress applied to `config` before pricing.
    pub scenario: Option<Scenario>,
    /// How many of the generated paths to hand back, starting from path 0.
    pub sample_paths: usize,
    pub execution: Execution,
}

impl PricingRequest {
    pub fn new(config: SimulationConfig, method: PricingMethod) -> Self {
        Self {
            config,
            method,
            seed: None,
            scenario: None,
            sample_paths: 0,
            execution: Execution::default(),
        }
    }

    pub fn monte_carlo(config: SimulationConfig) -> Self {
        Self::new(config, PricingMethod::MonteCarlo)
    }

    pub fn closed_form(config: SimulationConfig) -> Self {
        Self::new(config, PricingMethod::ClosedForm)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    pub fn with_sample_paths(mut self, count: usize) -> Self {
        self.sample_paths = count;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }
}

/// One line of a scenario sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// `None` for the unstressed baseline.
    pub scenario: Option<Scenario>,
    /// Spot the scenario was priced at.
    pub spot: f64,
    /// Volatility the scenario was priced at.
    pub volatility: f64,
    pub result: PricingResult,
}

/// Composes scenario adjustment, simulation, payoff evaluation and
/// discounting.
///
/// The engine holds no per-request state and can be shared across threads.
/// An optional cancellation flag aborts Monte Carlo batches as a whole.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    cancel: Option<Arc<AtomicBool>>,
}

impl PricingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that aborts with `PricingError::Cancelled` once `flag` is set.
    pub fn with_cancellation(flag: Arc<AtomicBool>) -> Self {
        Self { cancel: Some(flag) }
    }

    /// Price a single request.
    pub fn price(&self, request: &PricingRequest) -> Result<PricingResult, PricingError> {
        let run_id = Uuid::new_v4();
        let config = match request.scenario {
            Some(scenario) => {
                debug!("run {}: applying scenario {} ({})", run_id, scenario, scenario.description());
                ScenarioAdjuster::apply(&request.config, scenario)?
            }
            None => request.config.clone(),
        };

        info!(
            "run {}: pricing via {} (spot {}, vol {}, T {}, policy {})",
            run_id,
            request.method,
            config.spot(),
            config.volatility(),
            config.maturity(),
            config.payoff_policy()
        );

        let result = match request.method {
            PricingMethod::MonteCarlo => self.price_monte_carlo(run_id, &config, request)?,
            PricingMethod::ClosedForm => self.price_closed_form(run_id, &config)?,
        };

        info!("run {}: price {:.6}", run_id, result.price);
        Ok(result)
    }

    /// Price the unstressed baseline followed by each of `scenarios`.
    ///
    /// All entries share one seed, so differences between them come from
    /// the scenario and not from sampling noise.
    pub fn price_scenarios(
        &self,
        request: &PricingRequest,
        scenarios: &[Scenario],
    ) -> Result<Vec<ScenarioReport>, PricingError> {
        let seed = request
            .seed
            .unwrap_or_else(|| PathStreams::from_entropy().seed());

        let baseline = PricingRequest {
            scenario: None,
            seed: Some(seed),
            ..request.clone()
        };

        std::iter::once(None)
            .chain(scenarios.iter().copied().map(Some))
            .map(|scenario| {
                let req = PricingRequest {
                    scenario,
                    ..baseline.clone()
                };
                let config = match scenario {
                    Some(s) => ScenarioAdjuster::apply(&req.config, s)?,
                    None => req.config.clone(),
                };
                Ok(ScenarioReport {
                    scenario,
                    spot: config.spot(),
                    volatility: config.volatility(),
                    result: self.price(&req)?,
                })
            })
            .collect()
    }

    fn price_monte_carlo(
        &self,
        run_id: Uuid,
        config: &SimulationConfig,
        request: &PricingRequest,
    ) -> Result<PricingResult, PricingError> {
        self.check_cancelled()?;

        let streams = match request.seed {
            Some(seed) => PathStreams::from_seed(seed),
            None => PathStreams::from_entropy(),
        };
        let simulator = PathSimulator::new(config);
        let strategy = PayoffStrategy::from_config(config);
        let mode = strategy.generation_mode();
        let sample_limit = request.sample_paths.min(config.num_simulations());

        let mut warnings = Vec::new();
        if !config.is_risk_neutral() {
            let msg = format!(
                "drift rate {} differs from discount rate {}; the price is not a risk-neutral value",
                config.drift_rate(),
                config.discount_rate()
            );
            warn!("run {}: {}", run_id, msg);
            warnings.push(msg);
        }

        debug!(
            "run {}: {} paths x {} steps, {:?}, {:?}, seed {}",
            run_id,
            config.num_simulations(),
            config.steps_per_path(),
            mode,
            request.execution,
            streams.seed()
        );

        let evaluated = map_paths(config.num_simulations(), request.execution, |i| {
            self.check_cancelled()?;
            let mut rng = streams.stream(i);
            let path = simulator.simulate_path(i, &mut rng, mode)?;
            let outcome = strategy.evaluate(&path);
            Ok((outcome, (i < sample_limit).then_some(path)))
        })?;

        let (outcomes, samples): (Vec<_>, Vec<Option<PricePath>>) = evaluated.into_iter().unzip();
        let value = Discounter::from_config(config).discount(&outcomes)?;

        debug!(
            "run {}: mean payoff {:.6}, std error {:.6}, redemption rate {:.4}",
            run_id, value.mean_payoff, value.standard_error, value.redemption_rate
        );

        let mut result = PricingResult::new(run_id, PricingMethod::MonteCarlo, value.price);
        result.monte_carlo = Some(MonteCarloStats {
            num_simulations: value.count,
            seed: streams.seed(),
            mean_payoff: value.mean_payoff,
            standard_error: value.standard_error,
            redemption_rate: value.redemption_rate,
            discount_factor: value.discount_factor,
        });
        result.sample_paths = samples.into_iter().flatten().collect();
        result.warnings = warnings;
        Ok(result)
    }

    fn price_closed_form(
        &self,
        run_id: Uuid,
        config: &SimulationConfig,
    ) -> Result<PricingResult, PricingError> {
        let quote = ClosedFormPricer::price(config)?;
        warn!("run {}: {}", run_id, ClosedFormPricer::CAVEAT);

        let mut result = PricingResult::new(run_id, PricingMethod::ClosedForm, quote.price);
        result.is_approximation = true;
        result.warnings.push(ClosedFormPricer::CAVEAT.to_string());
        Ok(result)
    }

    fn check_cancelled(&self) -> Result<(), PricingError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(PricingError::Cancelled),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{PayoffPolicy, SimulationParams};
    use approx::assert_relative_eq;

    fn config(params: SimulationParams) -> SimulationConfig {
        SimulationConfig::new(params).unwrap()
    }

    fn small() -> SimulationParams {
        SimulationParams {
            steps_per_path: 24,
            num_simulations: 1_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_price() {
        let request = PricingRequest::monte_carlo(config(small())).with_seed(7);
        let engine = PricingEngine::new();
        let a = engine.price(&request).unwrap();
        let b = engine.price(&request).unwrap();
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_parallel_and_sequential_agree_bitwise() {
        let base = PricingRequest::monte_carlo(config(SimulationParams {
            payoff_policy: PayoffPolicy::FirstTouchObservation,
            coupon_amount: 0.05,
            ..small()
        }))
        .with_seed(99);
        let engine = PricingEngine::new();
        let par = engine.price(&base.clone().with_execution(Execution::Parallel)).unwrap();
        let seq = engine.price(&base.with_execution(Execution::Sequential)).unwrap();
        assert_eq!(par.price.to_bits(), seq.price.to_bits());
        assert_eq!(par.monte_carlo, seq.monte_carlo);
    }

    #[test]
    fn test_missing_seed_is_reported() {
        let request = PricingRequest::monte_carlo(config(small()));
        let engine = PricingEngine::new();
        let first = engine.price(&request).unwrap();
        let replay = engine
            .price(&request.clone().with_seed(first.seed().unwrap()))
            .unwrap();
        assert_eq!(first.price.to_bits(), replay.price.to_bits());
    }

    #[test]
    fn test_sample_paths_are_bounded() {
        let engine = PricingEngine::new();
        let cfg = config(SimulationParams {
            num_simulations: 5,
            ..small()
        });

        let none = engine.price(&PricingRequest::monte_carlo(cfg.clone()).with_seed(1)).unwrap();
        assert!(none.sample_paths.is_empty());

        let some = engine
            .price(&PricingRequest::monte_carlo(cfg.clone()).with_seed(1).with_sample_paths(3))
            .unwrap();
        assert_eq!(some.sample_paths.len(), 3);
        assert!(some.sample_paths.iter().all(|p| p.initial() == 100.0));

        let capped = engine
            .price(&PricingRequest::monte_carlo(cfg).with_seed(1).with_sample_paths(50))
            .unwrap();
        assert_eq!(capped.sample_paths.len(), 5);
    }

    #[test]
    fn test_concrete_zero_vol_scenario() {
        let cfg = config(SimulationParams {
            spot: 100.0,
            drift_rate: 0.02,
            volatility: 0.0,
            maturity: 1.0,
            steps_per_path: 1,
            num_simulations: 10,
            barrier_level: 110.0,
            coupon_amount: 0.05,
            protection_level: 80.0,
            payoff_policy: PayoffPolicy::AnyCrossingWithFloor,
            ..Default::default()
        });
        let result = PricingEngine::new()
            .price(&PricingRequest::monte_carlo(cfg).with_seed(3))
            .unwrap();
        let stats = result.monte_carlo.unwrap();
        assert_relative_eq!(stats.mean_payoff, 100.0 * 0.02_f64.exp(), max_relative = 1e-12);
        assert_relative_eq!(result.price, 100.0, max_relative = 1e-12);
        assert_eq!(stats.redemption_rate, 0.0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_decoupled_drift_warns_but_prices() {
        let cfg = config(SimulationParams {
            drift_rate: 0.08,
            discount_rate: Some(0.02),
            ..small()
        });
        let result = PricingEngine::new()
            .price(&PricingRequest::monte_carlo(cfg).with_seed(11))
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("not a risk-neutral"));
        assert_relative_eq!(
            result.monte_carlo.unwrap().discount_factor,
            (-0.02_f64).exp()
        );
    }

    #[test]
    fn test_closed_form_is_flagged_approximate() {
        let result = PricingEngine::new()
            .price(&PricingRequest::closed_form(SimulationConfig::default()))
            .unwrap();
        assert!(result.is_approximation);
        assert!(result.monte_carlo.is_none());
        assert_eq!(result.warnings, vec![ClosedFormPricer::CAVEAT.to_string()]);
    }

    #[test]
    fn test_scenario_is_applied_before_pricing() {
        let cfg = config(SimulationParams {
            volatility: 0.0,
            ..small()
        });
        let engine = PricingEngine::new();
        let base = engine.price(&PricingRequest::closed_form(cfg.clone())).unwrap();
        let up = engine
            .price(&PricingRequest::closed_form(cfg).with_scenario(Scenario::Up))
            .unwrap();
        // Zero vol, deep in the money: the call moves one-for-one with spot.
        assert_relative_eq!(up.price - base.price, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_price_scenarios_reports_baseline_first() {
        let request = PricingRequest::monte_carlo(config(small())).with_seed(5);
        let reports = PricingEngine::new()
            .price_scenarios(&request, &Scenario::ALL)
            .unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].scenario, None);
        assert_eq!(reports[1].scenario, Some(Scenario::Up));
        assert_relative_eq!(reports[1].spot, 110.0, max_relative = 1e-12);
        assert_eq!(reports[3].volatility, 0.10);
        assert!(reports.iter().all(|r| r.result.seed() == Some(5)));
    }

    #[test]
    fn test_cancelled_batch_returns_no_result() {
        let flag = Arc::new(AtomicBool::new(true));
        let engine = PricingEngine::with_cancellation(flag.clone());
        let request = PricingRequest::monte_carlo(config(small())).with_seed(1);
        assert_eq!(engine.price(&request).unwrap_err(), PricingError::Cancelled);

        flag.store(false, Ordering::Relaxed);
        assert!(engine.price(&request).is_ok());
    }

    #[test]
    fn test_early_redemption_keeps_long_paths_short() {
        let cfg = config(SimulationParams {
            spot: 1_000.0,
            barrier_level: 110.0,
            coupon_amount: 0.05,
            steps_per_path: crate::core::config::MAX_STEPS_PER_PATH,
            num_simulations: 4,
            payoff_policy: PayoffPolicy::FirstTouchObservation,
            ..Default::default()
        });
        let result = PricingEngine::new()
            .price(&PricingRequest::monte_carlo(cfg).with_seed(8).with_sample_paths(4))
            .unwrap();
        assert_eq!(result.redemption_rate(), Some(1.0));
        assert!(result.sample_paths.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn test_instability_surfaces_from_engine() {
        let cfg = config(SimulationParams {
            spot: 1e300,
            drift_rate: 1_000.0,
            volatility: 0.0,
            steps_per_path: 1,
            num_simulations: 4,
            ..Default::default()
        });
        let err = PricingEngine::new()
            .price(&PricingRequest::monte_carlo(cfg).with_seed(1))
            .unwrap_err();
        assert!(matches!(err, PricingError::NumericalInstability { .. }));
    }
}
