//! Named market stress scenarios.
//!
//! A scenario never mutates the configuration it is given; it returns a
//! new, re-validated [`SimulationConfig`].

use crate::core::config::{normalize_name, SimulationConfig};
use crate::core::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parameter override of the shape the named scenarios use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioShift {
    /// Multiplier applied to the initial spot.
    pub spot_multiplier: f64,
    /// Replacement volatility, if any.
    pub volatility: Option<f64>,
}

impl ScenarioShift {
    pub const IDENTITY: ScenarioShift = ScenarioShift {
        spot_multiplier: 1.0,
        volatility: None,
    };
}

/// Predefined market scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scenario {
    /// Spot up 10%.
    Up,
    /// Spot down 10%.
    Down,
    /// Volatility set to 10%.
    LowVol,
    /// Volatility set to 30%.
    HighVol,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Up,
        Scenario::Down,
        Scenario::LowVol,
        Scenario::HighVol,
    ];

    pub fn shift(&self) -> ScenarioShift {
        match self {
            Scenario::Up => ScenarioShift {
                spot_multiplier: 1.10,
                volatility: None,
            },
            Scenario::Down => ScenarioShift {
                spot_multiplier: 0.90,
                volatility: None,
            },
            Scenario::LowVol => ScenarioShift {
                spot_multiplier: 1.0,
                volatility: Some(0.10),
            },
            Scenario::HighVol => ScenarioShift {
                spot_multiplier: 1.0,
                volatility: Some(0.30),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Up => "Up",
            Scenario::Down => "Down",
            Scenario::LowVol => "LowVol",
            Scenario::HighVol => "HighVol",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Up => "market rally: initial price +10%",
            Scenario::Down => "market sell-off: initial price -10%",
            Scenario::LowVol => "calm market: volatility set to 10%",
            Scenario::HighVol => "turbulent market: volatility set to 30%",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "up" | "rally" => Ok(Scenario::Up),
            "down" | "selloff" => Ok(Scenario::Down),
            "lowvol" | "lowvolatility" => Ok(Scenario::LowVol),
            "highvol" | "highvolatility" => Ok(Scenario::HighVol),
            _ => Err(PricingError::unsupported("scenario", s)),
        }
    }
}

impl TryFrom<String> for Scenario {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scenario> for String {
    fn from(scenario: Scenario) -> Self {
        scenario.as_str().to_string()
    }
}

/// Applies scenario overrides to a configuration.
pub struct ScenarioAdjuster;

impl ScenarioAdjuster {
    /// Configuration under a named scenario.
    ///
    /// # Examples
    ///
    /// ```
    /// use autocall_pricer::core::config::SimulationConfig;
    /// use autocall_pricer::simulation::scenario::{Scenario, ScenarioAdjuster};
    ///
    /// let base = SimulationConfig::default();
    /// let stressed = ScenarioAdjuster::apply(&base, Scenario::LowVol).unwrap();
    /// assert_eq!(stressed.volatility(), 0.10);
    /// assert_eq!(base.volatility(), 0.20);
    /// ```
    pub fn apply(
        config: &SimulationConfig,
        scenario: Scenario,
    ) -> Result<SimulationConfig, PricingError> {
        Self::apply_shift(config, scenario.shift())
    }

    /// Configuration under an arbitrary shift.
    ///
    /// Fails with `InvalidConfiguration` if the shifted values leave their
    /// domain (for example a negative multiplier).
    pub fn apply_shift(
        config: &SimulationConfig,
        shift: ScenarioShift,
    ) -> Result<SimulationConfig, PricingError> {
        let mut params = config.to_params();
        params.spot *= shift.spot_multiplier;
        if let Some(volatility) = shift.volatility {
            params.volatility = volatility;
        }
        SimulationConfig::new(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationParams;

    fn base(spot: f64, volatility: f64) -> SimulationConfig {
        SimulationConfig::new(SimulationParams {
            spot,
            volatility,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_up_multiplies_spot() {
        let cfg = base(100.0, 0.2);
        let up = ScenarioAdjuster::apply(&cfg, Scenario::Up).unwrap();
        assert_eq!(up.spot(), 100.0 * 1.10);
        assert_eq!(up.volatility(), 0.2);
    }

    #[test]
    fn test_down_multiplies_spot() {
        let cfg = base(250.0, 0.2);
        let down = ScenarioAdjuster::apply(&cfg, Scenario::Down).unwrap();
        assert_eq!(down.spot(), 250.0 * 0.90);
    }

    #[test]
    fn test_vol_scenarios_override_regardless_of_prior() {
        for prior in [0.0, 0.05, 0.10, 0.45, 1.2] {
            let cfg = base(100.0, prior);
            assert_eq!(ScenarioAdjuster::apply(&cfg, Scenario::LowVol).unwrap().volatility(), 0.10);
            assert_eq!(ScenarioAdjuster::apply(&cfg, Scenario::HighVol).unwrap().volatility(), 0.30);
        }
    }

    #[test]
    fn test_original_config_untouched() {
        let cfg = base(100.0, 0.2);
        let _ = ScenarioAdjuster::apply(&cfg, Scenario::HighVol).unwrap();
        assert_eq!(cfg.volatility(), 0.2);
        assert_eq!(cfg.spot(), 100.0);
    }

    #[test]
    fn test_invalid_shift_rejected() {
        let cfg = base(100.0, 0.2);
        let shift = ScenarioShift {
            spot_multiplier: -1.0,
            volatility: None,
        };
        assert!(ScenarioAdjuster::apply_shift(&cfg, shift).is_err());
        assert_eq!(ScenarioAdjuster::apply_shift(&cfg, ScenarioShift::IDENTITY).unwrap(), cfg);
    }

    #[test]
    fn test_scenario_parsing() {
        assert_eq!("high-vol".parse::<Scenario>().unwrap(), Scenario::HighVol);
        assert_eq!("Low Volatility".parse::<Scenario>().unwrap(), Scenario::LowVol);
        assert_eq!("UP".parse::<Scenario>().unwrap(), Scenario::Up);
        assert!(matches!(
            "crash".parse::<Scenario>(),
            Err(PricingError::UnsupportedMethod { kind: "scenario", .. })
        ));
    }
}
