// Per-animal behavior: the state machine run once per animal per tick.
//
// `step_animal` is an `impl SimState` method so it can reach the grid, the
// PRNG, the config, and (through registry ids) the animal's partners. Each
// step runs these phases in order:
//
//   0. Chase update (hunted animals only): feed the current cell to the
//      hunter's queue and food target. If the hunter already stands here,
//      the animal is caught and dies on the spot.
//   1. Age one tick; advance or expire the mating cooldown.
//   2. Move: one random-walk step when the queue is empty, otherwise pop
//      the next queued cell (teleport). Long routes whose remainder has
//      dropped below half are replanned to their last cell first, which is
//      how chasers keep up with moving targets.
//   3. Arrival: reaching the food target eats, else reaching the water
//      target drinks.
//   4. Mating: a partner with no rendezvous point of its own is told to come
//      here; an animal standing on its rendezvous point mates and the step
//      ends there, skipping the death check.
//   5. Hunger and thirst grow by their rates.
//   6. Needs: only with an empty queue, and only the first applicable of
//      water search, food search, mate search.
//   7. Death: starvation, dehydration, then old age. Relations are severed
//      before the outcome is returned.
//
// The searches share one shape: a square window grows one cell per side per
// iteration up to a configured radius. Terrain windows are scanned
// row-major; animal candidates in registry key order. First match wins, and
// a route is planned immediately.
//
// Partner references are ids. Every dereference checks liveness (registry
// membership and not dead earlier this pass), and a dead partner just voids
// the relation.
//
// See also: `sim.rs` for the tick pass that calls `step_animal`,
// `animal.rs` for the fields this machine reads and writes,
// `pathfinding.rs` for routes, `genome.rs` for crossover.
//
// **Critical constraint: determinism.** The only randomness is the random
// walk direction and crossover, both drawn from `self.rng` in step order.

use crate::animal::Animal;
use crate::event::{Birth, DeathCause, SimEventKind, StepOutcome};
use crate::genome::Genome;
use crate::pathfinding::find_path;
use crate::sim::SimState;
use crate::species::Diet;
use crate::types::*;
use tracing::{debug, trace};

impl SimState {
    /// Run one tick of behavior for a live animal.
    pub(crate) fn step_animal(&mut self, id: AnimalId) -> StepOutcome {
        if let Some(outcome) = self.update_chase(id) {
            return outcome;
        }

        self.advance_age(id);
        self.move_animal(id);
        self.check_arrival(id);

        if let Some(birth) = self.tend_mate(id) {
            return StepOutcome::Reproduced(birth);
        }

        self.accumulate_needs(id);

        if self.population.get(id).is_some_and(|a| a.queue.is_empty()) {
            self.resolve_needs(id);
        }

        match self.death_cause(id) {
            Some(cause) => {
                self.sever_relations(id);
                StepOutcome::Died(cause)
            }
            None => StepOutcome::Alive,
        }
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    /// Keep a hunted animal's hunter on its trail. Returns `Some` if the
    /// hunter has caught it.
    fn update_chase(&mut self, id: AnimalId) -> Option<StepOutcome> {
        let prey = self.population.get(id)?;
        if !prey.hunted {
            return None;
        }
        let position = prey.position;
        let Some(hunter_id) = prey.hunter.filter(|&h| self.is_live(h)) else {
            let prey = self.population.get_mut(id)?;
            prey.hunted = false;
            prey.hunter = None;
            return None;
        };

        let hunter = self.population.get_mut(hunter_id)?;
        hunter.queue.push_back(position);
        hunter.food_target = Some(position);
        if hunter.position != position {
            return None;
        }
        hunter.hunger -= self.config.meal_relief(hunter.hunger_rate());

        debug!(prey = %id, hunter = %hunter_id, at = %position, "caught");
        self.sever_relations(id);
        Some(StepOutcome::Died(DeathCause::Predation))
    }

    fn advance_age(&mut self, id: AnimalId) {
        let cooldown_ticks = self.config.mating.cooldown_ticks;
        let Some(a) = self.population.get_mut(id) else {
            return;
        };
        a.age += 1;
        if let Some(c) = a.cooldown {
            a.cooldown = if c >= cooldown_ticks { None } else { Some(c + 1) };
        }
    }

    fn move_animal(&mut self, id: AnimalId) {
        let Some((position, queued, last, path_length)) = self
            .population
            .get(id)
            .map(|a| (a.position, a.queue.len(), a.queue.back().copied(), a.path_length))
        else {
            return;
        };

        let Some(goal) = last else {
            self.random_walk(id, position);
            return;
        };

        let replan_min = self.config.movement.replan_min_path_len;
        if path_length.is_some_and(|len| len > replan_min && queued * 2 < len) {
            let path = find_path(&self.grid, position, goal);
            trace!(animal = %id, %goal, steps = path.len(), "replanned");
            if let Some(a) = self.population.get_mut(id) {
                a.set_path(path);
            }
        }

        if let Some(a) = self.population.get_mut(id) {
            if let Some(next) = a.queue.pop_front() {
                a.position = next;
            }
        }
    }

    /// One roll for a direction; blocked moves (edge or water) are lost.
    fn random_walk(&mut self, id: AnimalId, position: GridCoord) {
        let (dc, dr) = ORTHOGONAL_STEPS[self.rng.roll_inclusive(0, 3) as usize];
        let target = position.offset(dc, dr);
        if !self.grid.in_bounds(target) || self.grid.is_water(target) {
            return;
        }
        if let Some(a) = self.population.get_mut(id) {
            a.position = target;
        }
    }

    fn check_arrival(&mut self, id: AnimalId) {
        let Some(a) = self.population.get_mut(id) else {
            return;
        };
        if a.food_target == Some(a.position) {
            a.food_target = None;
            a.hunger -= self.config.meal_relief(a.hunger_rate());
        } else if a.water_target == Some(a.position) {
            a.water_target = None;
            a.thirst -= self.config.meal_relief(a.thirst_rate());
        }
    }

    /// Answer a pending mate request, or mate if standing on the rendezvous
    /// point.
    fn tend_mate(&mut self, id: AnimalId) -> Option<Birth> {
        let a = self.population.get(id)?;
        let mate_id = a.mate?;
        let (position, rendezvous) = (a.position, a.mate_pos);

        if !self.is_live(mate_id) {
            let a = self.population.get_mut(id)?;
            a.mate = None;
            a.mate_pos = None;
            return None;
        }

        match rendezvous {
            None => {
                // The suitor walks to wherever we are now.
                let mate = self.population.get_mut(mate_id)?;
                mate.queue.push_back(position);
                mate.mate_pos = Some(position);
                None
            }
            Some(cell) if cell == position => self.mate_with(id, mate_id, position),
            Some(_) => None,
        }
    }

    /// The mating process. `id` is the dam, `mate_id` the sire.
    fn mate_with(
        &mut self,
        id: AnimalId,
        mate_id: AnimalId,
        position: GridCoord,
    ) -> Option<Birth> {
        let dam = self.population.get(id)?.genome.clone();
        let sire = self.population.get(mate_id)?.genome.clone();
        let genome = Genome::crossover(
            &dam,
            &sire,
            &mut self.rng,
            self.config.mating.mutation_one_in,
        );

        for parent in [id, mate_id] {
            if let Some(p) = self.population.get_mut(parent) {
                p.cooldown = Some(1);
                p.mate = None;
                p.mate_pos = None;
            }
        }

        debug!(animal = %id, mate = %mate_id, at = %position, "mated");
        Some(Birth {
            species: genome.species,
            position,
            genome,
        })
    }

    fn accumulate_needs(&mut self, id: AnimalId) {
        if let Some(a) = self.population.get_mut(id) {
            a.hunger += a.hunger_rate();
            a.thirst += a.thirst_rate();
        }
    }

    /// Start at most one search, by priority: water, food, mate.
    fn resolve_needs(&mut self, id: AnimalId) {
        let Some(a) = self.population.get(id) else {
            return;
        };
        let needs = &self.config.needs;
        let thirsty = a.thirst > needs.thirst_search_threshold && !a.seeking_water();
        let hungry = a.hunger > needs.hunger_search_threshold && !a.seeking_food();
        let wants_mate =
            a.mate.is_none() && a.age > self.config.mating.min_age && a.cooldown.is_none();

        if thirsty {
            self.find_water(id);
        } else if hungry {
            self.find_food(id);
        } else if wants_mate {
            self.find_mate(id);
        }
    }

    fn death_cause(&self, id: AnimalId) -> Option<DeathCause> {
        let a = self.population.get(id)?;
        let fatal = self.config.needs.fatal_level;
        if a.hunger >= fatal {
            Some(DeathCause::Starvation)
        } else if a.thirst >= fatal {
            Some(DeathCause::Dehydration)
        } else if f64::from(a.age) >= a.max_age() {
            Some(DeathCause::OldAge)
        } else {
            None
        }
    }

    /// Clear every relation between `id` and its partners, on both sides.
    fn sever_relations(&mut self, id: AnimalId) {
        let Some(a) = self.population.get_mut(id) else {
            return;
        };
        let mate = a.mate.take();
        let hunter = a.hunter.take().filter(|_| a.hunted);
        let prey = a.prey.take();
        a.mate_pos = None;
        a.hunted = false;

        if let Some(m) = mate.and_then(|m| self.population.get_mut(m)) {
            if m.mate == Some(id) {
                m.mate = None;
                m.mate_pos = None;
                m.clear_path();
            }
        }
        if let Some(h) = hunter.and_then(|h| self.population.get_mut(h)) {
            if h.prey == Some(id) {
                h.food_target = None;
                h.prey = None;
                h.clear_path();
            }
        }
        if let Some(p) = prey.and_then(|p| self.population.get_mut(p)) {
            if p.hunter == Some(id) {
                p.hunted = false;
                p.hunter = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Searches
    // -----------------------------------------------------------------------

    fn find_water(&mut self, id: AnimalId) {
        let radius = self.config.search.resource_radius;
        let Some(origin) = self.population.get(id).map(|a| a.position) else {
            return;
        };
        let Some((cell, path)) = self.route_to_terrain(origin, radius, Terrain::is_water) else {
            trace!(animal = %id, "no water in range");
            return;
        };
        if let Some(a) = self.population.get_mut(id) {
            a.water_target = Some(cell);
            a.set_path(path);
        }
    }

    /// Dispatch on the species' diet.
    fn find_food(&mut self, id: AnimalId) {
        let Ok(diet) = self.config.species_data(id.species).map(|d| d.diet) else {
            return;
        };
        let Some(hunger) = self.population.get(id).map(|a| a.hunger) else {
            return;
        };
        match diet {
            Diet::Berries => self.find_berry(id),
            Diet::Prey { prey } => self.find_prey(id, prey),
            Diet::Opportunist {
                prey,
                hunt_at_or_below,
            } => {
                if hunger <= hunt_at_or_below {
                    self.find_prey(id, prey);
                } else {
                    self.find_berry(id);
                }
            }
        }
    }

    fn find_berry(&mut self, id: AnimalId) {
        let radius = self.config.search.resource_radius;
        let Some(origin) = self.population.get(id).map(|a| a.position) else {
            return;
        };
        let Some((cell, path)) =
            self.route_to_terrain(origin, radius, |t| t == Terrain::Berry)
        else {
            trace!(animal = %id, "no berries in range");
            return;
        };
        if let Some(a) = self.population.get_mut(id) {
            a.food_target = Some(cell);
            a.set_path(path);
        }
    }

    fn find_prey(&mut self, id: AnimalId, prey_species: Species) {
        let huntable = self
            .config
            .species_data(prey_species)
            .is_ok_and(|d| d.huntable);
        let Some(origin) = self.population.get(id).map(|a| a.position) else {
            return;
        };
        if !huntable {
            return;
        }

        let radius = self.config.search.prey_radius;
        let found = self.nearest_animal(origin, radius, prey_species, |p| {
            !p.hunted && p.id != id
        });
        let Some((prey_id, prey_pos)) = found else {
            trace!(animal = %id, "no prey in range");
            return;
        };

        if let Some(p) = self.population.get_mut(prey_id) {
            p.hunted = true;
            p.hunter = Some(id);
        }
        let path = find_path(&self.grid, origin, prey_pos);
        if let Some(a) = self.population.get_mut(id) {
            a.food_target = Some(prey_pos);
            a.prey = Some(prey_id);
            a.set_path(path);
        }

        debug!(hunter = %id, prey = %prey_id, at = %prey_pos, "hunt started");
        self.push_event(SimEventKind::HuntStarted {
            hunter: id,
            prey: prey_id,
        });
    }

    fn find_mate(&mut self, id: AnimalId) {
        let radius = self.config.search.mate_radius;
        let min_age = self.config.mating.min_age;
        let Some(origin) = self.population.get(id).map(|a| a.position) else {
            return;
        };

        let found = self.nearest_animal(origin, radius, id.species, |c| {
            c.mate.is_none() && c.id != id && c.age > min_age
        });
        let Some((mate_id, mate_pos)) = found else {
            trace!(animal = %id, "no mate in range");
            return;
        };

        if let Some(m) = self.population.get_mut(mate_id) {
            m.mate = Some(id);
        }
        let path = find_path(&self.grid, origin, mate_pos);
        if let Some(a) = self.population.get_mut(id) {
            a.mate = Some(mate_id);
            a.mate_pos = Some(mate_pos);
            a.set_path(path);
        }

        debug!(animal = %id, mate = %mate_id, at = %mate_pos, "mate claimed");
        self.push_event(SimEventKind::MateClaimed {
            suitor: id,
            mate: mate_id,
        });
    }

    /// Nearest terrain cell matching `wanted`, plus a route to it. `None` if
    /// nothing is in range or the match cannot be reached; either way the
    /// search is retried on the next eligible tick.
    fn route_to_terrain(
        &self,
        origin: GridCoord,
        radius: u32,
        wanted: impl Fn(Terrain) -> bool,
    ) -> Option<(GridCoord, Vec<GridCoord>)> {
        let cell = self.scan_terrain(origin, radius, wanted)?;
        let path = find_path(&self.grid, origin, cell);
        if path.is_empty() {
            return None;
        }
        Some((cell, path))
    }

    /// Expanding-window terrain scan.
    ///
    /// Window `k` covers every cell within Chebyshev distance `k` of
    /// `origin`, clipped to the grid, and is scanned row-major. Cells already
    /// covered by window `k - 1` are skipped, which yields the same first
    /// match as rescanning the whole window.
    fn scan_terrain(
        &self,
        origin: GridCoord,
        radius: u32,
        wanted: impl Fn(Terrain) -> bool,
    ) -> Option<GridCoord> {
        let full = (
            GridCoord::new(0, 0),
            self.grid.clamp(GridCoord::new(i32::MAX, i32::MAX)),
        );
        for k in 1..=radius as i32 {
            let lo = self.grid.clamp(origin.offset(-k, -k));
            let hi = self.grid.clamp(origin.offset(k, k));
            for row in lo.row..=hi.row {
                for col in lo.col..=hi.col {
                    let cell = GridCoord::new(col, row);
                    if k > 1 && origin.chebyshev_distance(cell) < k as u32 {
                        continue;
                    }
                    if self.grid.get(cell).is_some_and(&wanted) {
                        return Some(cell);
                    }
                }
            }
            if (lo, hi) == full {
                break;
            }
        }
        None
    }

    /// Nearest live animal of `species` accepted by `eligible`, by window.
    ///
    /// An animal at Chebyshev distance `d` first appears in window
    /// `max(d, 1)`; within a window, the lowest key wins.
    fn nearest_animal(
        &self,
        origin: GridCoord,
        radius: u32,
        species: Species,
        eligible: impl Fn(&Animal) -> bool,
    ) -> Option<(AnimalId, GridCoord)> {
        let mut best: Option<(u32, AnimalId, GridCoord)> = None;
        for candidate in self.population.of_species(species) {
            if self.pending_dead.contains(&candidate.id) || !eligible(candidate) {
                continue;
            }
            let window = origin.chebyshev_distance(candidate.position).max(1);
            if window > radius {
                continue;
            }
            if best.is_none_or(|(w, _, _)| window < w) {
                best = Some((window, candidate.id, candidate.position));
            }
        }
        best.map(|(_, id, position)| (id, position))
    }
}
