//! autocall-pricer CLI
//!
//! Price autocallable notes from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Price with the default contract
//! autocall-pricer price
//!
//! # Reproducible run, JSON output
//! autocall-pricer price --seed 42 --format json
//!
//! # Parameters from a JSON file, some overridden
//! autocall-pricer price --config note.json --barrier 115 --sims 50000
//!
//! # Baseline plus every market scenario
//! autocall-pricer scenarios --seed 7
//!
//! # Historical volatility from closing prices
//! autocall-pricer volatility --prices 100,101.5,99.8,102.3
//! ```

use autocall_pricer::core::config::{PayoffPolicy, SimulationConfig, SimulationParams};
use autocall_pricer::core::result::PricingMethod;
use autocall_pricer::market::volatility::estimate_volatility;
use autocall_pricer::pricing::engine::{PricingEngine, PricingRequest};
use autocall_pricer::simulation::gbm::Execution;
use autocall_pricer::simulation::scenario::Scenario;
use serde::Serialize;
use std::fs;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"autocall-pricer — Monte Carlo pricing of autocallable notes

USAGE:
    autocall-pricer <COMMAND> [OPTIONS]

COMMANDS:
    price        Price one note
    scenarios    Price the baseline and the Up/Down/LowVol/HighVol scenarios
    volatility   Estimate annualized volatility from daily prices
    help         Show this message

OPTIONS (price, scenarios):
    --config <FILE>        JSON file with simulation parameters
    --spot <X>             Initial price (default: 100)
    --drift <X>            GBM drift rate (default: 0.05)
    --discount-rate <X>    Discount rate (default: same as drift)
    --vol <X>              Annualized volatility (default: 0.20)
    --maturity <X>         Maturity in years (default: 1)
    --steps <N>            Time steps per path (default: 252)
    --sims <N>             Number of paths (default: 10000)
    --barrier <X>          Autocall barrier (default: 110)
    --coupon <X>           Coupon (default: 5)
    --protection <X>       Protection floor (default: 80)
    --policy <NAME>        first-touch or any-crossing (default: any-crossing)
    --observe-every <N>    Observation interval in steps (default: 1)
    --method <NAME>        monte-carlo (default) or closed-form
    --seed <N>             Master seed (default: random, reported)
    --scenario <NAME>      up, down, low-vol or high-vol (price only)
    --samples <N>          Number of sample paths to return (default: 0)
    --sequential           Disable parallel path generation
    --format <FORMAT>      Output format: text (default) or json

OPTIONS (volatility):
    --prices <LIST>        Comma-separated daily prices
    --input <FILE>         JSON array of daily prices
    --format <FORMAT>      Output format: text (default) or json

Logging is controlled by RUST_LOG (e.g. RUST_LOG=debug).

EXAMPLES:
    autocall-pricer price --seed 42
    autocall-pricer price --policy first-touch --coupon 0.05 --observe-every 21
    autocall-pricer price --method closed-form --format json
    autocall-pricer scenarios --sims 20000 --seed 7
    autocall-pricer volatility --prices 100,101.5,99.8,102.3,101.1"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
}

fn parse_value<T: FromStr>(raw: &str, flag: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .unwrap_or_else(|e| fail(format!("invalid value '{}' for {}: {}", raw, flag, e)))
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("could not serialize output: {}", e)));
    println!("{}", json);
}

fn load_params(path: &str) -> SimulationParams {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));

    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format (every field optional):");
        eprintln!(
            r#"{{
  "spot": 100.0, "drift_rate": 0.05, "volatility": 0.2, "maturity": 1.0,
  "steps_per_path": 252, "num_simulations": 10000,
  "barrier_level": 110.0, "coupon_amount": 5.0, "protection_level": 80.0,
  "payoff_policy": "AnyCrossingWithFloor"
}}"#
        );
        process::exit(1);
    })
}

/// Options shared by `price` and `scenarios`.
struct PriceOptions {
    request: PricingRequest,
    format: String,
}

fn parse_price_options(args: &[String], allow_scenario: bool) -> PriceOptions {
    // The config file is read first so that flags override it regardless of order.
    let mut params = SimulationParams::default();
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(pos + 1)
            .unwrap_or_else(|| fail("--config requires a file path"));
        params = load_params(path);
    }

    let mut method = PricingMethod::MonteCarlo;
    let mut seed = None;
    let mut scenario = None;
    let mut samples = 0usize;
    let mut execution = Execution::Parallel;
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {
                next_value(args, &mut i, flag);
            }
            "--spot" => params.spot = parse_value(&next_value(args, &mut i, flag), flag),
            "--drift" => params.drift_rate = parse_value(&next_value(args, &mut i, flag), flag),
            "--discount-rate" => {
                params.discount_rate = Some(parse_value(&next_value(args, &mut i, flag), flag))
            }
            "--vol" => params.volatility = parse_value(&next_value(args, &mut i, flag), flag),
            "--maturity" => params.maturity = parse_value(&next_value(args, &mut i, flag), flag),
            "--steps" => params.steps_per_path = parse_value(&next_value(args, &mut i, flag), flag),
            "--sims" => params.num_simulations = parse_value(&next_value(args, &mut i, flag), flag),
            "--barrier" => params.barrier_level = parse_value(&next_value(args, &mut i, flag), flag),
            "--coupon" => params.coupon_amount = parse_value(&next_value(args, &mut i, flag), flag),
            "--protection" => {
                params.protection_level = parse_value(&next_value(args, &mut i, flag), flag)
            }
            "--policy" => {
                params.payoff_policy =
                    parse_value::<PayoffPolicy>(&next_value(args, &mut i, flag), flag)
            }
            "--observe-every" => {
                params.observation_interval = parse_value(&next_value(args, &mut i, flag), flag)
            }
            "--method" => method = parse_value(&next_value(args, &mut i, flag), flag),
            "--seed" => seed = Some(parse_value::<u64>(&next_value(args, &mut i, flag), flag)),
            "--scenario" if allow_scenario => {
                scenario = Some(parse_value::<Scenario>(&next_value(args, &mut i, flag), flag))
            }
            "--samples" => samples = parse_value(&next_value(args, &mut i, flag), flag),
            "--sequential" => execution = Execution::Sequential,
            "--format" => format = next_value(args, &mut i, flag),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    if format != "text" && format != "json" {
        fail(format!("--format requires 'text' or 'json', got '{}'", format));
    }

    let config = SimulationConfig::new(params).unwrap_or_else(|e| fail(e));
    let mut request = PricingRequest::new(config, method)
        .with_sample_paths(samples)
        .with_execution(execution);
    if let Some(seed) = seed {
        request = request.with_seed(seed);
    }
    if let Some(scenario) = scenario {
        request = request.with_scenario(scenario);
    }

    PriceOptions { request, format }
}

fn cmd_price(args: &[String]) {
    let opts = parse_price_options(args, true);
    let result = PricingEngine::new()
        .price(&opts.request)
        .unwrap_or_else(|e| fail(e));

    if opts.format == "json" {
        print_json(&result);
    } else {
        println!("{}", result);
    }
}

fn cmd_scenarios(args: &[String]) {
    let opts = parse_price_options(args, false);
    let reports = PricingEngine::new()
        .price_scenarios(&opts.request, &Scenario::ALL)
        .unwrap_or_else(|e| fail(e));

    if opts.format == "json" {
        print_json(&reports);
        return;
    }

    let baseline = reports.first().map(|r| r.result.price).unwrap_or(0.0);
    println!("=== Scenario Analysis ===");
    if let Some(seed) = reports.first().and_then(|r| r.result.seed()) {
        println!("Seed: {}", seed);
    }
    println!(
        "{:<10} {:>10} {:>8} {:>12} {:>10}",
        "Scenario", "Spot", "Vol", "Price", "Change"
    );
    for report in &reports {
        let name = report
            .scenario
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Baseline".to_string());
        println!(
            "{:<10} {:>10.2} {:>8.2} {:>12.4} {:>+10.4}",
            name,
            report.spot,
            report.volatility,
            report.result.price,
            report.result.price - baseline
        );
    }
    if let Some(first) = reports.first() {
        for warning in &first.result.warnings {
            println!("Warning: {}", warning);
        }
    }
}

#[derive(Serialize)]
struct VolatilityOutput {
    observations: usize,
    daily_volatility: f64,
    annualized_volatility: f64,
}

fn cmd_volatility(args: &[String]) {
    let mut prices: Option<Vec<f64>> = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--prices" => {
                let raw = next_value(args, &mut i, flag);
                prices = Some(
                    raw.split(',')
                        .map(|s| parse_value::<f64>(s.trim(), flag))
                        .collect(),
                );
            }
            "--input" => {
                let path = next_value(args, &mut i, flag);
                let content = fs::read_to_string(&path)
                    .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));
                prices = Some(serde_json::from_str(&content).unwrap_or_else(|e| {
                    fail(format!("expected a JSON array of prices: {}", e))
                }));
            }
            "--format" => format = next_value(args, &mut i, flag),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    let prices = prices.unwrap_or_else(|| fail("--prices <LIST> or --input <FILE> is required"));
    let estimate = estimate_volatility(&prices).unwrap_or_else(|e| fail(e));

    if format == "json" {
        print_json(&VolatilityOutput {
            observations: estimate.observations(),
            daily_volatility: estimate.daily_volatility,
            annualized_volatility: estimate.annualized_volatility,
        });
    } else {
        println!("=== Volatility Estimate ===");
        println!("Returns:        {}", estimate.observations());
        println!("Daily:          {:.6}", estimate.daily_volatility);
        println!(
            "Annualized:     {:.6} ({:.2}%)",
            estimate.annualized_volatility,
            estimate.annualized_volatility * 100.0
        );
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "price" => cmd_price(rest),
        "scenarios" => cmd_scenarios(rest),
        "volatility" => cmd_volatility(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
