//! Coarse geography used for travel-distance scoring.
//!
//! Addresses are free text, so classification is a keyword match and not a
//! geocoder. Anything that matches no keyword lands in [`Zone::Centrum`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Centrum,
    Noord,
    Oost,
    West,
    Zuid,
}

/// Checked top to bottom, first hit wins.
const ZONE_KEYWORDS: [(Zone, &[&str]); 5] = [
    (Zone::Centrum, &["centrum"]),
    (Zone::Noord, &["noord"]),
    (Zone::Oost, &["oost", "zuidoost"]),
    (Zone::West, &["west", "nieuw-west", "westpoort"]),
    (Zone::Zuid, &["zuid"]),
];

/// Zone pairs one step apart. Listed in both directions.
const ADJACENT_ZONES: [(Zone, Zone); 12] = [
    (Zone::Centrum, Zone::Noord),
    (Zone::Noord, Zone::Centrum),
    (Zone::Centrum, Zone::Oost),
    (Zone::Oost, Zone::Centrum),
    (Zone::Centrum, Zone::West),
    (Zone::West, Zone::Centrum),
    (Zone::Centrum, Zone::Zuid),
    (Zone::Zuid, Zone::Centrum),
    (Zone::Oost, Zone::Zuid),
    (Zone::Zuid, Zone::Oost),
    (Zone::West, Zone::Zuid),
    (Zone::Zuid, Zone::West),
];

const FAR: u8 = 2;

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Centrum, Zone::Noord, Zone::Oost, Zone::West, Zone::Zuid];

    pub fn of_address(address: &str) -> Zone {
        let address = address.to_lowercase();
        ZONE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| address.contains(keyword)))
            .map_or(Zone::Centrum, |&(zone, _)| zone)
    }

    /// Travel cost between two zones: 0 same, 1 adjacent, 2 anything else.
    pub fn distance(self, other: Zone) -> u8 {
        if self == other {
            0
        } else if ADJACENT_ZONES.contains(&(self, other)) {
            1
        } else {
            FAR
        }
    }
}
