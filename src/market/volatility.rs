//! Historical volatility estimation.
//!
//! Annualized volatility from a series of closing prices: the sample
//! standard deviation of daily log returns scaled by `sqrt(252)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Errors from volatility estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolatilityError {
    #[error("need at least {required} prices to estimate volatility, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("price at index {index} must be positive and finite, got {value}")]
    NonPositivePrice { index: usize, value: f64 },
}

/// Result of a volatility estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEstimate {
    pub log_returns: Vec<f64>,
    pub daily_volatility: f64,
    pub annualized_volatility: f64,
}

impl VolatilityEstimate {
    pub fn observations(&self) -> usize {
        self.log_returns.len()
    }
}

/// Minimum number of prices: two returns are needed for a sample deviation.
pub const MIN_PRICES: usize = 3;

/// Estimate annualized volatility from consecutive daily prices.
///
/// # Examples
///
/// ```
/// use autocall_pricer::market::volatility::estimate_volatility;
///
/// let flat = estimate_volatility(&[100.0, 100.0, 100.0]).unwrap();
/// assert_eq!(flat.annualized_volatility, 0.0);
///
/// assert!(estimate_volatility(&[100.0, 101.0]).is_err());
/// ```
pub fn estimate_volatility(prices: &[f64]) -> Result<VolatilityEstimate, VolatilityError> {
    if prices.len() < MIN_PRICES {
        return Err(VolatilityError::InsufficientData {
            required: MIN_PRICES,
            actual: prices.len(),
        });
    }

    if let Some((index, &value)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        return Err(VolatilityError::NonPositivePrice { index, value });
    }

    let log_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

    let n = log_returns.len() as f64;
    let mean = log_returns.iter().sum::<f64>() / n;
    let variance = log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let daily_volatility = variance.sqrt();

    Ok(VolatilityEstimate {
        log_returns,
        daily_volatility,
        annualized_volatility: daily_volatility * TRADING_DAYS_PER_YEAR.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let est = estimate_volatility(&prices).unwrap();
        assert_eq!(est.observations(), 9);
        assert!(est.annualized_volatility < 1e-12);
    }

    #[test]
    fn test_known_returns() {
        // Log returns +a, -a: mean 0, sample variance 2a^2.
        let a = 0.01_f64;
        let prices = [100.0, 100.0 * a.exp(), 100.0];
        let est = estimate_volatility(&prices).unwrap();
        assert_relative_eq!(est.daily_volatility, (2.0 * a * a).sqrt(), max_relative = 1e-10);
        assert_relative_eq!(
            est.annualized_volatility,
            est.daily_volatility * 252.0_f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            estimate_volatility(&[100.0, 101.0]).unwrap_err(),
            VolatilityError::InsufficientData { required: 3, actual: 2 }
        );
        assert!(estimate_volatility(&[]).is_err());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let err = estimate_volatility(&[100.0, 0.0, 101.0]).unwrap_err();
        assert_eq!(err, VolatilityError::NonPositivePrice { index: 1, value: 0.0 });

        let err = estimate_volatility(&[100.0, 101.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, VolatilityError::NonPositivePrice { index: 2, .. }));
    }
}
