// The animal entity: per-animal state the behavior machine reads and writes.
//
// There is no explicit state enum. What an animal is "doing" is implied by
// which optional fields are populated:
// - a non-empty `queue` means it is walking somewhere;
// - `food_target` / `water_target` mean it has picked a resource to reach;
// - `mate` plus `mate_pos` mean a rendezvous is in progress (a `mate` with no
//   `mate_pos` is the one-tick window where a suitor's request is still
//   waiting to be answered);
// - `prey` means it is hunting; `hunted` plus `hunter` mean it is being
//   hunted;
// - `cooldown` means it mated recently and may not look for a new mate.
//
// Cross-entity references (`mate`, `hunter`, `prey`) are registry-issued
// `AnimalId`s, never pointers. Every dereference goes through the registry's
// liveness check, and a dead partner is treated as "relation void".
//
// Presentation is not modeled here: an animal knows its grid cell and nothing
// about sprites. `pixel_position` is the single hook for renderers.
//
// See also: `behavior.rs` for the per-tick state machine, `population.rs` for
// the registry that owns animals, `genome.rs` for heritable stats.

use crate::genome::Genome;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single simulated animal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub genome: Genome,
    pub position: GridCoord,
    pub age: u32,
    /// Unbounded accumulators; start at 0.
    pub hunger: f64,
    pub thirst: f64,

    /// Pending cells to step through, front first.
    pub queue: VecDeque<GridCoord>,
    /// Length of the path most recently planned into `queue`.
    pub path_length: Option<usize>,

    pub food_target: Option<GridCoord>,
    pub water_target: Option<GridCoord>,

    pub mate: Option<AnimalId>,
    /// Rendezvous cell for the current mate.
    pub mate_pos: Option<GridCoord>,
    /// Ticks since the last mating; `None` once the cooldown has run out.
    pub cooldown: Option<u32>,

    /// Claimed by a hunter. Only ever set on huntable species.
    pub hunted: bool,
    pub hunter: Option<AnimalId>,
    pub prey: Option<AnimalId>,
}

impl Animal {
    pub fn new(id: AnimalId, position: GridCoord, genome: Genome) -> Self {
        Self {
            id,
            genome,
            position,
            age: 0,
            hunger: 0.0,
            thirst: 0.0,
            queue: VecDeque::new(),
            path_length: None,
            food_target: None,
            water_target: None,
            mate: None,
            mate_pos: None,
            cooldown: None,
            hunted: false,
            hunter: None,
            prey: None,
        }
    }

    pub fn species(&self) -> Species {
        self.id.species
    }

    /// Expressed (dominant) stats.
    pub fn max_age(&self) -> f64 {
        self.genome.max_age.dominant
    }

    pub fn hunger_rate(&self) -> f64 {
        self.genome.hunger_rate.dominant
    }

    pub fn thirst_rate(&self) -> f64 {
        self.genome.thirst_rate.dominant
    }

    /// True while a food search has a target: a berry bush or a prey animal.
    pub fn seeking_food(&self) -> bool {
        self.food_target.is_some() || self.prey.is_some()
    }

    pub fn seeking_water(&self) -> bool {
        self.water_target.is_some()
    }

    /// Replace the movement queue with a freshly planned path.
    pub fn set_path(&mut self, path: Vec<GridCoord>) {
        self.path_length = Some(path.len());
        self.queue = path.into();
    }

    /// Drop any pending movement.
    pub fn clear_path(&mut self) {
        self.queue.clear();
        self.path_length = None;
    }

    pub fn pixel_position(&self, tile_size: i32) -> PixelPos {
        self.position.to_pixel(tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::TraitPair;

    fn test_animal() -> Animal {
        let genome = Genome {
            species: Species::Carnivore,
            max_age: TraitPair::new(750.0, 720.0),
            hunger_rate: TraitPair::new(9.5, 12.0),
            thirst_rate: TraitPair::new(10.25, 8.0),
        };
        Animal::new(
            AnimalId::new(Species::Carnivore, AnimalKey(1)),
            GridCoord::new(3, 4),
            genome,
        )
    }

    #[test]
    fn new_animal_is_idle() {
        let a = test_animal();
        assert_eq!(a.age, 0);
        assert_eq!(a.hunger, 0.0);
        assert_eq!(a.thirst, 0.0);
        assert!(a.queue.is_empty());
        assert!(!a.seeking_food() && !a.seeking_water());
        assert!(a.mate.is_none() && a.cooldown.is_none());
        assert!(!a.hunted);
    }

    #[test]
    fn expressed_stats_are_dominant_alleles() {
        let a = test_animal();
        assert_eq!(a.max_age(), 750.0);
        assert_eq!(a.hunger_rate(), 9.5);
        assert_eq!(a.thirst_rate(), 10.25);
        assert_eq!(a.species(), Species::Carnivore);
    }

    #[test]
    fn set_path_records_length() {
        let mut a = test_animal();
        a.set_path(vec![GridCoord::new(3, 5), GridCoord::new(3, 6)]);
        assert_eq!(a.path_length, Some(2));
        assert_eq!(a.queue.front(), Some(&GridCoord::new(3, 5)));
        a.clear_path();
        assert!(a.queue.is_empty());
        assert_eq!(a.path_length, None);
    }

    #[test]
    fn active_prey_counts_as_seeking_food() {
        let mut a = test_animal();
        a.prey = Some(AnimalId::new(Species::Herbivore, AnimalKey(2)));
        assert!(a.seeking_food());
    }

    #[test]
    fn pixel_position_scales_by_tile() {
        assert_eq!(test_animal().pixel_position(5), PixelPos::new(15, 20));
    }
}
