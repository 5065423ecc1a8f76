use crate::core::config::normalize_name;
use crate::core::error::PricingError;
use crate::core::path::PricePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payoff of a single simulated path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffOutcome {
    /// Undiscounted payoff.
    pub payoff: f64,
    /// Step at which the note redeemed early, if it did.
    pub redemption_step: Option<usize>,
}

impl PayoffOutcome {
    pub fn redeemed(payoff: f64, step: usize) -> Self {
        Self {
            payoff,
            redemption_step: Some(step),
        }
    }

    pub fn at_maturity(payoff: f64) -> Self {
        Self {
            payoff,
            redemption_step: None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.redemption_step.is_some()
    }
}

/// Valuation technique selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PricingMethod {
    MonteCarlo,
    /// Vanilla-call benchmark; see [`crate::pricing::closed_form`].
    ClosedForm,
}

impl PricingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMethod::MonteCarlo => "MonteCarlo",
            PricingMethod::ClosedForm => "ClosedForm",
        }
    }
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingMethod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "montecarlo" | "mc" => Ok(PricingMethod::MonteCarlo),
            "closedform" | "blackscholes" | "bs" => Ok(PricingMethod::ClosedForm),
            _ => Err(PricingError::unsupported("pricing method", s)),
        }
    }
}

impl TryFrom<String> for PricingMethod {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PricingMethod> for String {
    fn from(method: PricingMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Aggregate statistics of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloStats {
    pub num_simulations: usize,
    /// Seed the per-path streams were derived from. Re-running with this
    /// seed reproduces the price bit for bit.
    pub seed: u64,
    /// Mean undiscounted payoff.
    pub mean_payoff: f64,
    /// Standard error of the discounted price estimate.
    pub standard_error: f64,
    /// Fraction of paths that redeemed before maturity.
    pub redemption_rate: f64,
    pub discount_factor: f64,
}

/// Outcome of one pricing request.
///
/// `sample_paths` holds at most the number of paths the caller asked for
/// and is empty by default; the engine never keeps paths for its own use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResult {
    pub run_id: Uuid,
    pub priced_at: DateTime<Utc>,
    pub method: PricingMethod,
    /// Present value.
    pub price: f64,
    /// True when `price` comes from an approximating benchmark rather than
    /// from the autocall payoff itself.
    pub is_approximation: bool,
    pub monte_carlo: Option<MonteCarloStats>,
    pub sample_paths: Vec<PricePath>,
    pub warnings: Vec<String>,
}

impl PricingResult {
    pub(crate) fn new(run_id: Uuid, method: PricingMethod, price: f64) -> Self {
        Self {
            run_id,
            priced_at: Utc::now(),
            method,
            price,
            is_approximation: false,
            monte_carlo: None,
            sample_paths: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Seed of the Monte Carlo run, if this result came from one.
    pub fn seed(&self) -> Option<u64> {
        self.monte_carlo.as_ref().map(|s| s.seed)
    }

    pub fn redemption_rate(&self) -> Option<f64> {
        self.monte_carlo.as_ref().map(|s| s.redemption_rate)
    }
}

impl fmt::Display for PricingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pricing Result ===")?;
        writeln!(f, "Run:            {}", self.run_id)?;
        writeln!(f, "Method:         {}", self.method)?;
        if self.is_approximation {
            writeln!(f, "Price:          {:.4} (approximate benchmark)", self.price)?;
        } else {
            writeln!(f, "Price:          {:.4}", self.price)?;
        }

        if let Some(stats) = &self.monte_carlo {
            writeln!(f, "Simulations:    {}", stats.num_simulations)?;
            writeln!(f, "Seed:           {}", stats.seed)?;
            writeln!(f, "Mean Payoff:    {:.4}", stats.mean_payoff)?;
            writeln!(f, "Std Error:      {:.4}", stats.standard_error)?;
            writeln!(f, "Redemption:     {:.1}%", stats.redemption_rate * 100.0)?;
            writeln!(f, "Discount:       {:.6}", stats.discount_factor)?;
        }

        if !self.sample_paths.is_empty() {
            writeln!(f, "Sample Paths:   {}", self.sample_paths.len())?;
        }

        for warning in &self.warnings {
            writeln!(f, "Warning:        {}", warning)?;
        }
        Ok(())
    }
}
