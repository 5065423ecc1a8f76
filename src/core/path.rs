use crate::core::error::PricingError;
use serde::{Deserialize, Serialize};

/// One simulated trajectory of the underlying.
///
/// `prices[0]` is the initial fixing `S0`; `prices[t]` is the price after
/// `t` simulation steps. A full path has `steps_per_path + 1` entries. A path
/// generated in early-exit mode stops at its redemption step.
///
/// Paths are immutable once generated.
///
/// # Examples
///
/// ```
/// use autocall_pricer::core::path::PricePath;
///
/// let path = PricePath::new(vec![100.0, 104.0, 98.0]);
/// assert_eq!(path.initial(), 100.0);
/// assert_eq!(path.terminal(), 98.0);
/// assert_eq!(path.maximum(), 104.0);
/// assert_eq!(path.steps(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PricePath {
    prices: Vec<f64>,
}

impl PricePath {
    /// Wrap a price sequence.
    ///
    /// # Panics
    ///
    /// Panics if `prices` is empty.
    pub fn new(prices: Vec<f64>) -> Self {
        assert!(!prices.is_empty(), "PricePath must contain at least the initial price");
        Self { prices }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn initial(&self) -> f64 {
        self.prices[0]
    }

    pub fn terminal(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    /// Highest price on the path, initial fixing included.
    pub fn maximum(&self) -> f64 {
        self.prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of simulated steps (excludes the initial fixing).
    pub fn steps(&self) -> usize {
        self.prices.len() - 1
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// `(step, price)` pairs for the simulated steps, `t = 1..`.
    pub fn simulated_steps(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.prices.iter().copied().enumerate().skip(1)
    }
}

impl TryFrom<Vec<f64>> for PricePath {
    type Error = PricingError;

    fn try_from(prices: Vec<f64>) -> Result<Self, Self::Error> {
        if prices.is_empty() {
            return Err(PricingError::invalid(
                "prices",
                "[]",
                "a path must contain at least the initial price",
            ));
        }
        Ok(Self { prices })
    }
}

impl From<PricePath> for Vec<f64> {
    fn from(path: PricePath) -> Self {
        path.prices
    }
}
