//! Closed-form benchmark valuation.
//!
//! Prices a plain European call struck at the protection level. This is an
//! **approximation**, not the value of the autocall: the formula knows
//! nothing about the barrier or early redemption. It is useful as a sanity
//! anchor next to the Monte Carlo figure, never as a substitute for it.

use crate::core::config::SimulationConfig;
use crate::core::error::PricingError;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Benchmark price with its intermediate terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosedFormQuote {
    pub price: f64,
    pub strike: f64,
    /// `None` in the degenerate cases (zero strike or zero total variance).
    pub d1: Option<f64>,
    pub d2: Option<f64>,
}

/// Vanilla-call benchmark pricer.
pub struct ClosedFormPricer;

impl ClosedFormPricer {
    /// Attached to every result this pricer produces.
    pub const CAVEAT: &'static str = "closed-form value is a vanilla call struck at the \
        protection level; it ignores the barrier and early redemption and is an \
        approximate benchmark only";

    /// Benchmark value for `config`, using `protection_level` as strike and
    /// the discount rate as `r`.
    pub fn price(config: &SimulationConfig) -> Result<ClosedFormQuote, PricingError> {
        let quote = Self::call_quote(
            config.spot(),
            config.protection_level(),
            config.discount_rate(),
            config.volatility(),
            config.maturity(),
        );
        if !quote.price.is_finite() {
            return Err(PricingError::unstable("closed-form price", quote.price));
        }
        Ok(quote)
    }

    /// Black-Scholes call price.
    ///
    /// # Examples
    ///
    /// ```
    /// use autocall_pricer::pricing::closed_form::ClosedFormPricer;
    ///
    /// let price = ClosedFormPricer::black_scholes_call(100.0, 100.0, 0.05, 0.2, 1.0);
    /// assert!((price - 10.4506).abs() < 1e-4);
    /// ```
    pub fn black_scholes_call(spot: f64, strike: f64, rate: f64, volatility: f64, maturity: f64) -> f64 {
        Self::call_quote(spot, strike, rate, volatility, maturity).price
    }

    fn call_quote(spot: f64, strike: f64, rate: f64, volatility: f64, maturity: f64) -> ClosedFormQuote {
        let discounted_strike = strike * (-rate * maturity).exp();

        // ln(S/0) diverges; the call is worth the spot.
        if strike <= 0.0 {
            return ClosedFormQuote {
                price: spot,
                strike,
                d1: None,
                d2: None,
            };
        }

        let vol_sqrt_t = volatility * maturity.sqrt();
        // Zero variance: deterministic forward, intrinsic value on it.
        if vol_sqrt_t == 0.0 {
            return ClosedFormQuote {
                price: (spot - discounted_strike).max(0.0),
                strike,
                d1: None,
                d2: None,
            };
        }

        let d1 = ((spot / strike).ln() + (rate + 0.5 * volatility * volatility) * maturity) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;
        ClosedFormQuote {
            price: spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
            strike,
            d1: Some(d1),
            d2: Some(d2),
        }
    }
}
