//! Market scenario sweep.
//!
//! Estimates volatility from a short price history, then prices the note
//! under the baseline and every named scenario with common random numbers.

use autocall_pricer::market::volatility::estimate_volatility;
use autocall_pricer::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  autocall-pricer: Market Scenarios       ║");
    println!("╚══════════════════════════════════════════╝\n");

    let history = [
        100.0, 101.3, 100.2, 102.8, 103.5, 101.9, 104.2, 105.0, 103.7, 104.9, 106.1,
    ];
    let estimate = estimate_volatility(&history).unwrap();
    println!(
        "Estimated volatility from {} returns: {:.2}%\n",
        estimate.observations(),
        estimate.annualized_volatility * 100.0
    );

    let config = SimulationConfig::new(SimulationParams {
        spot: *history.last().unwrap(),
        volatility: estimate.annualized_volatility,
        barrier_level: 115.0,
        num_simulations: 20_000,
        ..Default::default()
    })
    .unwrap();

    let reports = PricingEngine::new()
        .price_scenarios(&PricingRequest::monte_carlo(config).with_seed(7), &Scenario::ALL)
        .unwrap();

    let baseline = reports[0].result.price;
    println!(
        "{:<10} {:>8} {:>6} {:>10} {:>10} {:>10}",
        "Scenario", "Spot", "Vol", "Price", "Change", "Redeemed"
    );
    for report in &reports {
        let name = report
            .scenario
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Baseline".into());
        println!(
            "{:<10} {:>8.2} {:>6.2} {:>10.4} {:>+10.4} {:>9.1}%",
            name,
            report.spot,
            report.volatility,
            report.result.price,
            report.result.price - baseline,
            report.result.redemption_rate().unwrap_or(0.0) * 100.0
        );
    }
}
