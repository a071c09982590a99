// Core simulation state and tick loop.
//
// `SimState` is the single source of truth for a running ecosystem. It owns
// the terrain grid, the population registry, the PRNG, and the config. The
// sim is a pure function of its inputs: `(map, config, seed) -> tick reports`.
//
// On construction (`new()`), the sim spawns one animal with a freshly rolled
// genome at every den in the map, in row-major order.
//
// ## Tick pass
//
// `tick()` is arena-style: snapshot, step, then commit.
//
//   1. Snapshot the ids of all live animals, in spawn order.
//   2. Step each snapshotted animal once (see `behavior.rs`). An animal that
//      reports death is parked in `pending_dead`: it stays in the registry
//      until the commit, but every liveness check and candidate scan skips
//      it, so later animals in the same pass see it as gone.
//   3. Commit: remove the dead, then spawn the newborns. Newborns are not in
//      the snapshot, so they are first stepped next tick.
//
// Cross-animal writes during step 2 (a mate being asked over, a hunter being
// fed its prey's position) are visible immediately to animals stepped later
// in the same pass.
//
// See also: `behavior.rs` for the per-animal state machine, `population.rs`
// for the registry, `event.rs` for `TickReport`, `config.rs` for tunables.
//
// **Critical constraint: determinism.** One `GameRng`, `BTreeMap`/`BTreeSet`
// everywhere, spawn-order iteration. Same map, config, and seed: same run.

use crate::animal::Animal;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::event::{SimEvent, SimEventKind, StepOutcome, TickReport};
use crate::genome::Genome;
use crate::grid::{Grid, MapLayout};
use crate::population::Population;
use crate::types::*;
use ecosim_prng::GameRng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// The complete simulation state.
#[derive(Clone, Debug)]
pub struct SimState {
    /// Number of completed ticks.
    pub tick: u64,

    /// The sim's sole source of randomness.
    pub rng: GameRng,

    /// Tunables. Never mutated by the sim.
    pub config: SimConfig,

    /// Terrain. Read-only during a run.
    pub grid: Grid,

    /// Every live animal.
    pub population: Population,

    /// Animals that reported death earlier in the current pass.
    pub(crate) pending_dead: BTreeSet<AnimalId>,

    /// Narrative events collected during the current pass.
    pub(crate) events: Vec<SimEvent>,
}

impl SimState {
    /// Build a world from a parsed map and populate every den.
    pub fn new(layout: MapLayout, config: SimConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let MapLayout { grid, dens } = layout;
        let mut sim = Self {
            tick: 0,
            rng: GameRng::new(seed),
            config,
            grid,
            population: Population::new(),
            pending_dead: BTreeSet::new(),
            events: Vec::new(),
        };

        for (species, position) in dens {
            sim.spawn(species, position, None)?;
        }

        let counts = sim.counts();
        info!(
            width = sim.grid.width(),
            height = sim.grid.height(),
            herbivores = counts[&Species::Herbivore],
            carnivores = counts[&Species::Carnivore],
            omnivores = counts[&Species::Omnivore],
            "world built"
        );
        Ok(sim)
    }

    /// Add an animal at `position`. Without a genome, one is rolled from the
    /// species' configured ranges; a supplied genome must carry `species`.
    pub fn spawn(
        &mut self,
        species: Species,
        position: GridCoord,
        genome: Option<Genome>,
    ) -> Result<AnimalId, SimError> {
        if !self.grid.in_bounds(position) {
            return Err(SimError::OutOfBounds(position));
        }
        let data = self.config.species_data(species)?;
        let genome = match genome {
            Some(genome) if genome.species != species => {
                return Err(SimError::GenomeSpeciesMismatch {
                    species,
                    genome: genome.species,
                });
            }
            Some(genome) => genome,
            None => Genome::random(species, &data.genome, &mut self.rng),
        };
        Ok(self.population.insert(species, position, genome))
    }

    /// Advance the world by one tick.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        self.tick += 1;
        let snapshot = self.population.snapshot();
        let mut outcomes = Vec::with_capacity(snapshot.len());

        for id in snapshot {
            if !self.is_live(id) {
                continue;
            }
            let outcome = self.step_animal(id);
            if matches!(outcome, StepOutcome::Died(_)) {
                self.pending_dead.insert(id);
            }
            outcomes.push((id, outcome));
        }

        if let Err(e) = self.commit(&outcomes) {
            // A failed pass reports nothing; its events must not leak into
            // the next report.
            self.events.clear();
            return Err(e);
        }

        Ok(TickReport {
            tick: self.tick,
            outcomes,
            events: std::mem::take(&mut self.events),
        })
    }

    /// Apply the structural changes collected during a pass.
    fn commit(&mut self, outcomes: &[(AnimalId, StepOutcome)]) -> Result<(), SimError> {
        for (id, outcome) in outcomes {
            let (id, StepOutcome::Died(cause)) = (*id, outcome) else {
                continue;
            };
            let cause = *cause;
            if let Some(animal) = self.population.remove(id) {
                debug!(animal = %id, ?cause, at = %animal.position, age = animal.age, "died");
                self.push_event(SimEventKind::AnimalDied {
                    id,
                    cause,
                    position: animal.position,
                });
            }
        }
        self.pending_dead.clear();

        for (parent, outcome) in outcomes {
            let StepOutcome::Reproduced(birth) = outcome else {
                continue;
            };
            let child = self.spawn(birth.species, birth.position, Some(birth.genome.clone()))?;
            debug!(animal = %child, parent = %parent, at = %birth.position, "born");
            self.push_event(SimEventKind::AnimalBorn {
                id: child,
                parent: *parent,
                position: birth.position,
            });
        }
        Ok(())
    }

    pub(crate) fn push_event(&mut self, kind: SimEventKind) {
        self.events.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }

    /// In the registry and not already dead this pass.
    pub fn is_live(&self, id: AnimalId) -> bool {
        !self.pending_dead.contains(&id) && self.population.contains(id)
    }

    // -----------------------------------------------------------------------
    // Views for presentation adapters
    // -----------------------------------------------------------------------

    /// Live counts for every species.
    pub fn counts(&self) -> BTreeMap<Species, usize> {
        self.population.counts()
    }

    pub fn total(&self) -> usize {
        self.population.len()
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.population.get(id)
    }

    /// Live animals in spawn order.
    pub fn animals(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.population.iter()
    }

    /// Screen position of an animal at the configured tile size.
    pub fn pixel_position(&self, id: AnimalId) -> Option<PixelPos> {
        self.animal(id)
            .map(|a| a.pixel_position(self.config.tile_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CODE_BERRY, CODE_CARNIVORE, CODE_GRASS, CODE_HERBIVORE, CODE_OMNIVORE, CODE_WATER};

    /// A small mixed map: a pond in the middle, berries on the edges, and a
    /// handful of dens of each species.
    fn meadow() -> MapLayout {
        let (g, b, w) = (CODE_GRASS, CODE_BERRY, CODE_WATER);
        let (h, c, o) = (CODE_HERBIVORE, CODE_CARNIVORE, CODE_OMNIVORE);
        let mut rows = vec![vec![g; 20]; 20];
        for row in rows.iter_mut().skip(8).take(4) {
            for cell in row.iter_mut().skip(8).take(4) {
                *cell = w;
            }
        }
        for i in [1, 6, 13, 18] {
            rows[0][i] = b;
            rows[19][i] = b;
            rows[i][0] = b;
            rows[i][19] = b;
        }
        for (col, row) in [(3, 3), (5, 3), (3, 5), (14, 15), (16, 15), (15, 16)] {
            rows[row][col] = h;
        }
        rows[4][16] = c;
        rows[16][4] = o;
        rows[15][3] = o;
        MapLayout::from_codes(&rows).unwrap()
    }

    #[test]
    fn new_populates_every_den() {
        let sim = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let counts = sim.counts();
        assert_eq!(counts[&Species::Herbivore], 6);
        assert_eq!(counts[&Species::Carnivore], 1);
        assert_eq!(counts[&Species::Omnivore], 2);
        assert_eq!(sim.total(), 9);
        assert_eq!(sim.tick, 0);
    }

    #[test]
    fn dens_spawn_in_row_major_order() {
        let sim = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let positions: Vec<_> = sim.animals().map(|a| a.position).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        for a in sim.animals() {
            assert_eq!(a.age, 0);
            assert_eq!(a.genome.species, a.species());
        }
    }

    #[test]
    fn spawn_outside_grid_is_rejected() {
        let mut sim = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let result = sim.spawn(Species::Herbivore, GridCoord::new(20, 0), None);
        assert!(matches!(result, Err(SimError::OutOfBounds(p)) if p == GridCoord::new(20, 0)));
    }

    #[test]
    fn spawn_with_genome_of_other_species_is_rejected() {
        let mut sim = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let before = sim.total();
        let carni = sim
            .animals()
            .find(|a| a.species() == Species::Carnivore)
            .unwrap()
            .genome
            .clone();
        let result = sim.spawn(Species::Herbivore, GridCoord::new(1, 1), Some(carni.clone()));
        assert!(matches!(
            result,
            Err(SimError::GenomeSpeciesMismatch {
                species: Species::Herbivore,
                genome: Species::Carnivore,
            })
        ));
        assert_eq!(sim.total(), before);
        assert!(sim.spawn(Species::Carnivore, GridCoord::new(1, 1), Some(carni)).is_ok());
    }

    #[test]
    fn prey_species_missing_from_table_is_rejected() {
        let mut config = SimConfig::default();
        config.species.remove(&Species::Herbivore);
        let layout = MapLayout::from_codes(&[[CODE_GRASS, CODE_CARNIVORE]]).unwrap();
        assert!(matches!(
            SimState::new(layout, config, 1),
            Err(SimError::UnconfiguredSpecies(Species::Herbivore))
        ));
    }

    #[test]
    fn den_of_unconfigured_species_is_rejected() {
        let mut config = SimConfig::default();
        config.species.remove(&Species::Carnivore);
        let result = SimState::new(meadow(), config, 1);
        assert!(matches!(
            result,
            Err(SimError::UnconfiguredSpecies(Species::Carnivore))
        ));
    }

    #[test]
    fn tick_advances_counter_and_reports_every_animal() {
        let mut sim = SimState::new(meadow(), SimConfig::default(), 9).unwrap();
        let before = sim.total();
        let report = sim.tick().unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(sim.tick, 1);
        assert_eq!(report.outcomes.len(), before);
    }

    #[test]
    fn dead_animals_leave_the_registry_at_commit() {
        let mut sim = SimState::new(meadow(), SimConfig::default(), 4).unwrap();
        let victim = sim.animals().next().unwrap().id;
        sim.population.get_mut(victim).unwrap().thirst = 5000.0;
        let report = sim.tick().unwrap();
        assert!(report.deaths().any(|(id, _)| id == victim));
        assert!(sim.animal(victim).is_none());
        assert!(report.events.iter().any(|e| matches!(
            e.kind,
            SimEventKind::AnimalDied { id, .. } if id == victim
        )));
        assert!(sim.pending_dead.is_empty());
    }

    #[test]
    fn pixel_position_uses_tile_size() {
        let sim = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let a = sim.animals().next().unwrap();
        assert_eq!(
            sim.pixel_position(a.id),
            Some(PixelPos::new(a.position.col * 5, a.position.row * 5))
        );
    }

    #[test]
    fn determinism_two_sims_same_seed() {
        let mut a = SimState::new(meadow(), SimConfig::default(), 42).unwrap();
        let mut b = SimState::new(meadow(), SimConfig::default(), 42).unwrap();
        for _ in 0..300 {
            let ra = a.tick().unwrap();
            let rb = b.tick().unwrap();
            assert_eq!(ra.outcomes, rb.outcomes);
            assert_eq!(ra.events, rb.events);
        }
        let pa: Vec<_> = a.animals().map(|x| (x.id, x.position, x.age)).collect();
        let pb: Vec<_> = b.animals().map(|x| (x.id, x.position, x.age)).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.rng.next_u64(), b.rng.next_u64());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimState::new(meadow(), SimConfig::default(), 1).unwrap();
        let mut b = SimState::new(meadow(), SimConfig::default(), 2).unwrap();
        for _ in 0..20 {
            a.tick().unwrap();
            b.tick().unwrap();
        }
        let pa: Vec<_> = a.animals().map(|x| x.position).collect();
        let pb: Vec<_> = b.animals().map(|x| x.position).collect();
        assert_ne!(pa, pb);
    }
}
