use crate::core::config::SimulationConfig;
use crate::core::error::PricingError;
use crate::core::result::PayoffOutcome;
use serde::{Deserialize, Serialize};

/// Expected payoff brought back to today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountedValue {
    /// `mean_payoff * discount_factor`
    pub price: f64,
    pub mean_payoff: f64,
    /// Standard error of `price`; zero for a single outcome.
    pub standard_error: f64,
    pub redemption_rate: f64,
    pub count: usize,
    pub discount_factor: f64,
}

/// Continuous-compounding discounter, `PV = E[payoff] * exp(-r * T)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discounter {
    rate: f64,
    maturity: f64,
}

impl Discounter {
    pub fn new(rate: f64, maturity: f64) -> Self {
        Self { rate, maturity }
    }

    /// Discounts at the configuration's discount rate, which is the drift
    /// unless the caller decoupled them.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.discount_rate(), config.maturity())
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    pub fn present_value(&self, amount: f64) -> f64 {
        amount * self.discount_factor()
    }

    /// Average `outcomes` and discount the mean.
    ///
    /// Outcomes are summed in slice order, so the same outcomes always give
    /// the same bits regardless of how they were produced.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `outcomes` is empty.
    /// - `NumericalInstability` if any payoff, or the mean, is non-finite.
    pub fn discount(&self, outcomes: &[PayoffOutcome]) -> Result<DiscountedValue, PricingError> {
        if outcomes.is_empty() {
            return Err(PricingError::invalid(
                "num_simulations",
                0,
                "no payoff outcomes to aggregate",
            ));
        }

        let mut sum = 0.0;
        let mut redeemed = 0usize;
        for (i, outcome) in outcomes.iter().enumerate() {
            if !outcome.payoff.is_finite() {
                return Err(PricingError::unstable(
                    format!("payoff of path {}", i),
                    outcome.payoff,
                ));
            }
            sum += outcome.payoff;
            if outcome.is_redeemed() {
                redeemed += 1;
            }
        }

        let n = outcomes.len() as f64;
        let mean = sum / n;
        if !mean.is_finite() {
            return Err(PricingError::unstable("mean payoff", mean));
        }

        let variance = if outcomes.len() > 1 {
            outcomes
                .iter()
                .map(|o| (o.payoff - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        } else {
            0.0
        };

        let factor = self.discount_factor();
        let price = mean * factor;
        if !price.is_finite() {
            return Err(PricingError::unstable("discounted price", price));
        }

        Ok(DiscountedValue {
            price,
            mean_payoff: mean,
            standard_error: factor * (variance / n).sqrt(),
            redemption_rate: redeemed as f64 / n,
            count: outcomes.len(),
            discount_factor: factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_outcome_discounting() {
        let disc = Discounter::new(0.02, 1.0);
        let payoff = 100.0 * 0.02_f64.exp();
        let value = disc.discount(&[PayoffOutcome::at_maturity(payoff)]).unwrap();
        assert_relative_eq!(value.price, 100.0, epsilon = 1e-10);
        assert_eq!(value.standard_error, 0.0);
        assert_eq!(value.redemption_rate, 0.0);
    }

    #[test]
    fn test_mean_and_redemption_rate() {
        let disc = Discounter::new(0.0, 1.0);
        let outcomes = [
            PayoffOutcome::redeemed(5.0, 10),
            PayoffOutcome::at_maturity(80.0),
            PayoffOutcome::redeemed(5.0, 3),
            PayoffOutcome::at_maturity(90.0),
        ];
        let value = disc.discount(&outcomes).unwrap();
        assert_relative_eq!(value.price, 45.0);
        assert_relative_eq!(value.redemption_rate, 0.5);
        assert_eq!(value.count, 4);
        assert!(value.standard_error > 0.0);
    }

    #[test]
    fn test_empty_outcomes_rejected() {
        let err = Discounter::new(0.05, 1.0).discount(&[]).unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { field: "num_simulations", .. }
        ));
    }

    #[test]
    fn test_non_finite_payoff_rejected() {
        let outcomes = [PayoffOutcome::at_maturity(1.0), PayoffOutcome::at_maturity(f64::NAN)];
        let err = Discounter::new(0.05, 1.0).discount(&outcomes).unwrap_err();
        match err {
            PricingError::NumericalInstability { context, .. } => assert!(context.contains("path 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_sum_rejected() {
        let outcomes = [PayoffOutcome::at_maturity(f64::MAX), PayoffOutcome::at_maturity(f64::MAX)];
        let err = Discounter::new(0.0, 1.0).discount(&outcomes).unwrap_err();
        assert!(matches!(err, PricingError::NumericalInstability { .. }));
    }

    #[test]
    fn test_discount_factor() {
        let disc = Discounter::new(0.05, 2.0);
        assert_relative_eq!(disc.discount_factor(), (-0.1_f64).exp());
        assert_relative_eq!(disc.present_value(10.0), 10.0 * (-0.1_f64).exp());
    }
}
