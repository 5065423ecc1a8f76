//! Basic autocall pricing example.
//!
//! Prices the same note under both payoff policies and next to the
//! closed-form benchmark.

use autocall_pricer::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  autocall-pricer: Basic Pricing Example  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let engine = PricingEngine::new();

    // --- Scenario 1: Fixed coupon, floored at maturity ---
    println!("━━━ Scenario 1: Any Crossing With Floor ━━━\n");

    let config = SimulationConfig::new(SimulationParams {
        spot: 100.0,
        drift_rate: 0.05,
        volatility: 0.20,
        maturity: 1.0,
        barrier_level: 110.0,
        coupon_amount: 5.0,
        protection_level: 80.0,
        payoff_policy: PayoffPolicy::AnyCrossingWithFloor,
        ..Default::default()
    })
    .unwrap();

    let any_crossing = engine
        .price(&PricingRequest::monte_carlo(config.clone()).with_seed(42).with_sample_paths(3))
        .unwrap();
    println!("{}", any_crossing);

    for (i, path) in any_crossing.sample_paths.iter().enumerate() {
        println!(
            "  Path {}: start {:.2}, high {:.2}, end {:.2}",
            i,
            path.initial(),
            path.maximum(),
            path.terminal()
        );
    }
    println!();

    // --- Scenario 2: Price-scaled coupon on monthly observations ---
    println!("━━━ Scenario 2: First Touch, Monthly Observation ━━━\n");

    let first_touch_config = SimulationConfig::new(SimulationParams {
        coupon_amount: 0.05,
        payoff_policy: PayoffPolicy::FirstTouchObservation,
        observation_interval: 21,
        ..config.to_params()
    })
    .unwrap();

    let first_touch = engine
        .price(&PricingRequest::monte_carlo(first_touch_config).with_seed(42))
        .unwrap();
    println!("{}", first_touch);

    // --- Scenario 3: Closed-form benchmark ---
    println!("━━━ Scenario 3: Closed-Form Benchmark ━━━\n");

    let benchmark = engine.price(&PricingRequest::closed_form(config)).unwrap();
    println!("{}", benchmark);
    println!(
        "Monte Carlo vs benchmark: {:.4} vs {:.4}",
        any_crossing.price, benchmark.price
    );
}
