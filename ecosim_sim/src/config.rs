// Data-driven simulation configuration.
//
// All tunable parameters live here in `SimConfig`, optionally loaded from
// JSON. The behavior code never uses magic numbers; it reads thresholds,
// search radii, and meal sizes from the config. Every field has a default, so
// a JSON file only needs to name the values it overrides.
//
// Parameters are grouped into sub-structs by concern: `NeedsConfig` (hunger,
// thirst, meals), `MatingConfig`, `SearchConfig`, `MovementConfig`. Species
// genome ranges and diets live in the `species` table (see `species.rs`).
//
// See also: `sim.rs` which owns the `SimConfig` as part of `SimState`,
// `species.rs` for `SpeciesData`, `behavior.rs` which reads these values.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Same map, same config, same seed: same run.

use crate::error::SimError;
use crate::species::{Diet, GenomeRanges, SpeciesData};
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level sim configuration. Never mutated while a simulation runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Pixels per grid cell, for presentation adapters.
    pub tile_size: i32,

    pub needs: NeedsConfig,
    pub mating: MatingConfig,
    pub search: SearchConfig,
    pub movement: MovementConfig,

    /// Per-species genome ranges and diet. Keyed by `Species` enum.
    pub species: BTreeMap<Species, SpeciesData>,
}

/// Hunger and thirst thresholds and meal sizes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Thirst above this starts a water search.
    pub thirst_search_threshold: f64,
    /// Hunger above this starts a food search.
    pub hunger_search_threshold: f64,
    /// Hunger or thirst at or above this is fatal.
    pub fatal_level: f64,
    /// A meal or drink relieves `meal_base * (meal_rate_ceiling - rate)`,
    /// so animals with a slow metabolism get more out of each meal.
    pub meal_base: f64,
    pub meal_rate_ceiling: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatingConfig {
    /// Animals must be strictly older than this to look for a mate.
    pub min_age: u32,
    /// Post-mating cooldown length in ticks.
    pub cooldown_ticks: u32,
    /// Offspring genomes mutate with probability `1 / mutation_one_in`.
    pub mutation_one_in: u64,
}

/// Maximum window half-widths for the expanding-square searches.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Water and berry searches.
    pub resource_radius: u32,
    pub mate_radius: u32,
    pub prey_radius: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Only paths originally longer than this are replanned mid-route.
    pub replan_min_path_len: usize,
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a species' data, failing for species absent from the table.
    pub fn species_data(&self, species: Species) -> Result<&SpeciesData, SimError> {
        self.species
            .get(&species)
            .ok_or(SimError::UnconfiguredSpecies(species))
    }

    /// Check cross-references in the species table: every species a diet
    /// hunts must itself be configured.
    pub fn validate(&self) -> Result<(), SimError> {
        for data in self.species.values() {
            if let Some(prey) = data.diet.prey_species() {
                self.species_data(prey)?;
            }
        }
        Ok(())
    }

    /// Hunger or thirst relief from one meal for an animal with the given
    /// metabolic rate.
    pub fn meal_relief(&self, rate: f64) -> f64 {
        self.needs.meal_base * (self.needs.meal_rate_ceiling - rate)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut species = BTreeMap::new();
        species.insert(
            Species::Herbivore,
            SpeciesData {
                genome: GenomeRanges {
                    max_age: (500, 600),
                    hunger_rate: (5.0, 10.0),
                    thirst_rate: (5.0, 10.0),
                },
                diet: Diet::Berries,
                huntable: true,
            },
        );
        species.insert(
            Species::Carnivore,
            SpeciesData {
                genome: GenomeRanges {
                    max_age: (700, 800),
                    hunger_rate: (8.0, 15.0),
                    thirst_rate: (8.0, 15.0),
                },
                diet: Diet::Prey {
                    prey: Species::Herbivore,
                },
                huntable: false,
            },
        );
        species.insert(
            Species::Omnivore,
            SpeciesData {
                genome: GenomeRanges {
                    max_age: (900, 1000),
                    hunger_rate: (8.0, 15.0),
                    thirst_rate: (8.0, 15.0),
                },
                diet: Diet::Opportunist {
                    prey: Species::Herbivore,
                    hunt_at_or_below: 50.0,
                },
                huntable: false,
            },
        );

        Self {
            tile_size: 5,
            needs: NeedsConfig::default(),
            mating: MatingConfig::default(),
            search: SearchConfig::default(),
            movement: MovementConfig::default(),
            species,
        }
    }
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            thirst_search_threshold: 500.0,
            hunger_search_threshold: 350.0,
            fatal_level: 1000.0,
            meal_base: 350.0,
            meal_rate_ceiling: 20.0,
        }
    }
}

impl Default for MatingConfig {
    fn default() -> Self {
        Self {
            min_age: 100,
            cooldown_ticks: 100,
            mutation_one_in: 20,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            resource_radius: 31,
            mate_radius: 31,
            prey_radius: 41,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            replan_min_path_len: 4,
        }
    }
}
