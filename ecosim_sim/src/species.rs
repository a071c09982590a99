// Species data: data-driven per-species configuration.
//
// All differences between herbivores, carnivores, and omnivores are expressed
// as data in `SpeciesData`, keyed by `Species` in the sim config. The sim uses
// a single `Animal` type and reads species-specific values from this table at
// runtime. The only behavioral branch is `Diet`, a small closed enum consumed
// by `find_food` in `behavior.rs`.
//
// See also: `config.rs` where the species table lives, `genome.rs` which
// rolls initial genomes from `GenomeRanges`, `behavior.rs` for the diet
// dispatch.
//
// **Critical constraint: determinism.** Species data is part of the sim
// config; two runs with different tables are different simulations.

use crate::types::Species;
use serde::{Deserialize, Serialize};

/// Data-driven parameters for one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    /// Ranges for randomly generated (non-inherited) genomes.
    pub genome: GenomeRanges,

    /// What `find_food` looks for when this species gets hungry.
    pub diet: Diet,

    /// If true, animals of this species can be claimed as prey, and while
    /// hunted they feed their position to the hunter every tick.
    pub huntable: bool,
}

/// Ranges a fresh genome's alleles are drawn from.
///
/// `max_age` is an inclusive integer range. Rates are float ranges; drawn
/// values are rounded to two decimals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenomeRanges {
    pub max_age: (u32, u32),
    pub hunger_rate: (f64, f64),
    pub thirst_rate: (f64, f64),
}

/// Food search strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Diet {
    /// Walk to the nearest berry bush.
    Berries,
    /// Hunt the nearest unclaimed animal of `prey`.
    Prey { prey: Species },
    /// Hunt `prey` while hunger is at or below `hunt_at_or_below`, otherwise
    /// eat berries.
    Opportunist { prey: Species, hunt_at_or_below: f64 },
}

impl Diet {
    /// The species this diet may hunt, if any.
    pub fn prey_species(self) -> Option<Species> {
        match self {
            Diet::Berries => None,
            Diet::Prey { prey } | Diet::Opportunist { prey, .. } => Some(prey),
        }
    }
}
