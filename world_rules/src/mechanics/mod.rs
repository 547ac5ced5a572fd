//! World enums: signal frequencies, curiosities, and input bindings.

use serde::{Deserialize, Serialize};

/// Signal frequencies the player can tune the scope to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Traveler,
    Beacon,
    Quantum,
}

impl Frequency {
    /// Display name used in feed notices.
    pub fn display_name(&self) -> &'static str {
        match self {
            Frequency::Traveler => "Traveler",
            Frequency::Beacon => "Distress Beacon",
            Frequency::Quantum => "Quantum Fluctuations",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Research threads that group clues in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curiosity {
    AncientProbeLauncher,
    QuantumMoon,
    Vessel,
    TimeLoopDevice,
}

/// Input that commits an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InputButton {
    #[default]
    Primary,
    Secondary,
}

impl InputButton {
    /// Label shown at the start of an action prompt.
    pub fn label(&self) -> &'static str {
        match self {
            InputButton::Primary => "Left click",
            InputButton::Secondary => "Right click",
        }
    }
}
