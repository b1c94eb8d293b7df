//! The static description of the simulated road.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The road and crossing layout a simulation was run against.
///
/// Parsed from the simulator's TOML config; keys other than the ones
/// below belong to the simulator and are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Length of the road in m.
    pub road_length: f64,
    /// Positions of the zebra crossings along the road, in m.
    /// A pedestrian's location is an index into this list.
    pub zebra_crossings: Vec<f64>,
}

impl Scenario {
    /// Creates a scenario.
    pub fn new(road_length: f64, zebra_crossings: Vec<f64>) -> Self {
        Self {
            road_length,
            zebra_crossings,
        }
    }

    /// Loads a scenario from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let scenario = Self::from_str(&content)?;
        log::info!(
            "Loaded scenario from {}: road length {} m, {} crossing(s)",
            path.display(),
            scenario.road_length,
            scenario.zebra_crossings.len()
        );
        Ok(scenario)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// Fails with [Error::InvalidScenario] if the road length is negative or
    /// any position is not finite.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks that the road has a finite, non-negative length and that every
    /// crossing lies at a finite position.
    pub fn validate(&self) -> Result<()> {
        if !self.road_length.is_finite() || self.road_length < 0.0 {
            return Err(Error::InvalidScenario {
                field: "road_length",
                value: self.road_length,
            });
        }
        match self.zebra_crossings.iter().find(|pos| !pos.is_finite()) {
            Some(&value) => Err(Error::InvalidScenario {
                field: "zebra_crossings",
                value,
            }),
            None => Ok(()),
        }
    }

    /// Serializes the scenario as a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Gets the position of the crossing with the given index.
    pub fn crossing(&self, location: usize) -> Option<f64> {
        self.zebra_crossings.get(location).copied()
    }
}
