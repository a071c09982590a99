// Population registry: owns every live animal.
//
// Animals are stored in one `BTreeMap<AnimalKey, Animal>` per species. Each
// species has its own monotonic key counter starting at 1; keys are never
// reused while the registry lives, so a stale `AnimalId` held by a partner
// simply fails `get()` instead of aliasing a newer animal.
//
// A separate roster records global spawn order. The tick loop snapshots the
// roster before stepping anyone, so animals are processed oldest-first
// regardless of species, and newborns added after the pass are not stepped
// until the next tick.
//
// The registry is deliberately dumb: it does not validate positions, roll
// genomes, or sever relations. `SimState` does those and then calls
// `insert`/`remove`.
//
// See also: `sim.rs` which drives the registry from the tick loop,
// `animal.rs` for the entity type, `behavior.rs` for the per-animal step.
//
// **Critical constraint: determinism.** All collections are `BTreeMap`s;
// iteration order is key order (per species) or spawn order (roster).

use crate::animal::Animal;
use crate::genome::Genome;
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Population {
    /// Live animals, per species, in key order.
    tables: BTreeMap<Species, BTreeMap<AnimalKey, Animal>>,
    /// Last key issued per species.
    last_keys: BTreeMap<Species, u64>,
    /// Global spawn order: sequence number to animal.
    roster: BTreeMap<u64, AnimalId>,
    /// Reverse of `roster`, for O(log n) removal.
    roster_seq: BTreeMap<AnimalId, u64>,
    next_seq: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new animal and return its freshly issued id.
    pub fn insert(&mut self, species: Species, position: GridCoord, genome: Genome) -> AnimalId {
        let last = self.last_keys.entry(species).or_insert(0);
        *last += 1;
        let id = AnimalId::new(species, AnimalKey(*last));

        self.tables
            .entry(species)
            .or_default()
            .insert(id.key, Animal::new(id, position, genome));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.roster.insert(seq, id);
        self.roster_seq.insert(id, seq);
        id
    }

    /// Remove an animal. Relations pointing at it are the caller's problem.
    pub fn remove(&mut self, id: AnimalId) -> Option<Animal> {
        let animal = self.tables.get_mut(&id.species)?.remove(&id.key)?;
        if let Some(seq) = self.roster_seq.remove(&id) {
            self.roster.remove(&seq);
        }
        Some(animal)
    }

    pub fn get(&self, id: AnimalId) -> Option<&Animal> {
        self.tables.get(&id.species)?.get(&id.key)
    }

    pub fn get_mut(&mut self, id: AnimalId) -> Option<&mut Animal> {
        self.tables.get_mut(&id.species)?.get_mut(&id.key)
    }

    pub fn contains(&self, id: AnimalId) -> bool {
        self.get(id).is_some()
    }

    /// Live animals of one species, in key order.
    pub fn of_species(&self, species: Species) -> impl Iterator<Item = &Animal> + '_ {
        self.tables.get(&species).into_iter().flat_map(|t| t.values())
    }

    /// All live animals, in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.roster.values().filter_map(|&id| self.get(id))
    }

    /// Ids of all live animals, in spawn order. The tick loop's snapshot.
    pub fn snapshot(&self) -> Vec<AnimalId> {
        self.roster.values().copied().collect()
    }

    pub fn count(&self, species: Species) -> usize {
        self.tables.get(&species).map_or(0, BTreeMap::len)
    }

    /// Live counts for every species, including extinct ones (as 0).
    pub fn counts(&self) -> BTreeMap<Species, usize> {
        Species::ALL.iter().map(|&s| (s, self.count(s))).collect()
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }
}
