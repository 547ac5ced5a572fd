//! Clue definitions - entries in the ship's log database.

use serde::{Deserialize, Serialize};
use world_rules::Curiosity;

/// A discoverable fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    pub curiosity: Curiosity,
    pub name: String,
    pub description: String,
    /// Only ever goes from false to true.
    pub discovered: bool,
    /// Set once the clue has been used somewhere in the world.
    pub invoked: bool,
}

impl Clue {
    /// Create an undiscovered clue.
    pub fn new(
        curiosity: Curiosity,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            curiosity,
            name: name.into(),
            description: description.into(),
            discovered: false,
            invoked: false,
        }
    }

    pub fn with_discovered(mut self, discovered: bool) -> Self {
        self.discovered = discovered;
        self
    }
}

/// The full clue catalog, in database order.
pub fn clue_catalog(start_discovered: bool) -> Vec<Clue> {
    use Curiosity::*;

    [
        (
            AncientProbeLauncher,
            "APL_1",
            "Sunken Module",
            "The data-collection module broke off the Nomai probe launcher and sank to the core of Giant's Deep.",
        ),
        (
            AncientProbeLauncher,
            "APL_2",
            "Raging Tornadoes",
            "Most tornadoes on Giant's Deep have strong updrafts, but the ones spinning counter-clockwise pull downward.",
        ),
        (
            AncientProbeLauncher,
            "APL_3",
            "Jellyfish",
            "The hollow body of a Giant's Deep jellyfish is just large enough to hold a person.",
        ),
        (
            QuantumMoon,
            "QM_3",
            "The Fifth Location",
            "The quantum moon sometimes visits a fifth location beyond the solar system.",
        ),
        (
            QuantumMoon,
            "QM_1",
            "Quantum Imaging",
            "Observing a photograph of a quantum object stops it from moving, just like observing the object itself.",
        ),
        (
            QuantumMoon,
            "QM_2",
            "Quantum Entanglement",
            "Ordinary objects near a quantum object become entangled with it and start behaving quantumly.\n\nEven living things become entangled, as long as they cannot observe themselves or their surroundings.",
        ),
        (
            Vessel,
            "D_1",
            "The Lost Vessel",
            "The Nomai came to this system searching for a mysterious signal they called the Eye of the Universe. Their vessel crashed somewhere inside Dark Bramble.",
        ),
        (
            Vessel,
            "D_2",
            "A Children's Game",
            "Nomai children played a game re-enacting their escape from Dark Bramble: three players (escape pods) sneak past a blindfolded player (the anglerfish).",
        ),
        (
            Vessel,
            "D_3",
            "Tracking Device",
            "The Nomai vessel crashed at the roots of Dark Bramble. The Nomai tried to insert a tracker into one of the vines to find the roots again, but could not pierce its hard skin.",
        ),
        (
            TimeLoopDevice,
            "TLD_1",
            "Time Loop Device",
            "After building a small working time loop device on Giant's Deep, Nomai researchers planned a full-scale one on the Ash Twin, if they could power it.",
        ),
        (
            TimeLoopDevice,
            "TLD_2",
            "Warp Towers",
            "The Nomai built towers that warp anyone inside to a matching receiver platform, but only while the destination is visible through the top of the tower.",
        ),
        (
            TimeLoopDevice,
            "TLD_3",
            "The Great Project",
            "The Nomai hollowed out the Hourglass Twins to build a device that harnesses the energy of a supernova.\n\nIts control center sits in a hollow cavity at the planet's center, sealed off from the surface.",
        ),
    ]
    .into_iter()
    .map(|(curiosity, id, name, description)| {
        Clue::new(curiosity, id, name, description).with_discovered(start_discovered)
    })
    .collect()
}
