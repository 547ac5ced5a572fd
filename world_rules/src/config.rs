//! Game configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RulesResult;

/// Tunables for a playthrough. Missing keys fall back to [`GameConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Action points available at the start of every loop.
    pub action_points_per_loop: u32,
    pub start_with_launch_codes: bool,
    pub start_with_coordinates: bool,
    /// Start knowing the beacon and quantum frequencies as well as the traveler one.
    pub start_with_signals: bool,
    /// Seed every clue in the catalog as already discovered.
    pub start_with_clues: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            action_points_per_loop: 15,
            start_with_launch_codes: false,
            start_with_coordinates: false,
            start_with_signals: false,
            start_with_clues: false,
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> RulesResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> RulesResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Budget at or below which the "sun is dying" notice fires.
    ///
    /// Expressed as `remaining * 4 <= max` to stay in integers.
    pub fn is_below_warning_threshold(&self, remaining: u32) -> bool {
        remaining.saturating_mul(4) <= self.action_points_per_loop
    }
}
