// ecosim_sim — pure Rust grid ecosystem simulation library.
//
// This crate contains all simulation logic for the ecosystem: the terrain
// grid, the animal registry, heredity, A* routing, and the per-animal
// behavior state machine. It has no rendering or windowing dependencies and
// can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:         Top-level SimState, world construction, arena-style tick loop.
// - `behavior.rs`:    Per-animal state machine (movement, needs, searches, mating, hunting, death).
// - `grid.rs`:        Terrain grid + map parsing from integer codes.
// - `pathfinding.rs`: A* pathfinding over the terrain grid.
// - `population.rs`:  Population registry — per-species keyed tables + spawn-order roster.
// - `animal.rs`:      Animal entity (needs, movement queue, relations).
// - `genome.rs`:      Dominant/recessive trait pairs, random rolls, crossover, mutation.
// - `event.rs`:       Step outcomes, tick reports, narrative SimEvents.
// - `config.rs`:      SimConfig — all tunable parameters, JSON-loadable.
// - `species.rs`:     SpeciesData — data-driven diets and genome ranges.
// - `error.rs`:       SimError.
// - `prng`:           Re-exported from `ecosim_prng` — xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:       GridCoord, PixelPos, animal IDs, Terrain, Species enum.
//
// Presentation (sprites, windows, frame timing) is out of scope: the sim
// exposes grid positions, pixel positions at the configured tile size, and
// per-species counts, and nothing else. The companion `ecosim_headless`
// binary drives it from the command line.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(map, config, seed) -> tick reports`. All randomness comes from a seeded
// xoshiro256++ PRNG (re-exported from `ecosim_prng`). No `HashMap`, no system
// time, no OS entropy. Use `BTreeMap` for ordered collections.

pub mod animal;
mod behavior;
pub mod config;
pub mod error;
pub mod event;
pub mod genome;
pub mod grid;
pub mod pathfinding;
pub mod population;
pub use ecosim_prng as prng;
pub mod sim;
pub mod species;
pub mod types;
