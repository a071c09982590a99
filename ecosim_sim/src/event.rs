// Tick outcomes and narrative events.
//
// Every call to `SimState::tick()` returns a `TickReport`. It carries two
// related but distinct things:
// - `outcomes`: one `StepOutcome` per animal stepped this tick, in step
//   order. This is the machine-facing result (alive, died, reproduced) the
//   registry commits after the pass.
// - `events`: `SimEvent`s describing what happened in words a presentation
//   layer can show (births, deaths with cause, mate claims, hunt claims),
//   stamped with the tick number.
//
// See also: `sim.rs` for the tick loop that builds reports, `behavior.rs`
// which produces outcomes and events.
//
// **Critical constraint: determinism.** Outcomes and events are appended in
// step order, so the same run always yields the same report sequence.

use crate::genome::Genome;
use crate::types::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Step outcomes
// ---------------------------------------------------------------------------

/// Why an animal died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Dehydration,
    OldAge,
    /// Caught by its hunter.
    Predation,
}

/// A newborn waiting to be spawned once the tick's pass completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Birth {
    pub species: Species,
    pub position: GridCoord,
    pub genome: Genome,
}

/// The result of stepping one animal for one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepOutcome {
    Alive,
    Died(DeathCause),
    Reproduced(Birth),
}

// ---------------------------------------------------------------------------
// Narrative events
// ---------------------------------------------------------------------------

/// A narrative event emitted by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A newborn was added to the registry. `parent` ran the mating process.
    AnimalBorn {
        id: AnimalId,
        parent: AnimalId,
        position: GridCoord,
    },
    AnimalDied {
        id: AnimalId,
        cause: DeathCause,
        position: GridCoord,
    },
    /// `suitor` found `mate` and asked it to come over.
    MateClaimed { suitor: AnimalId, mate: AnimalId },
    HuntStarted { hunter: AnimalId, prey: AnimalId },
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Everything one tick produced.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// The tick number just completed.
    pub tick: u64,
    pub outcomes: Vec<(AnimalId, StepOutcome)>,
    pub events: Vec<SimEvent>,
}

impl TickReport {
    /// Animals that died this tick, with their cause.
    pub fn deaths(&self) -> impl Iterator<Item = (AnimalId, DeathCause)> + '_ {
        self.outcomes.iter().filter_map(|(id, outcome)| match outcome {
            StepOutcome::Died(cause) => Some((*id, *cause)),
            _ => None,
        })
    }

    /// Births requested this tick, keyed by the parent that ran the mating.
    pub fn births(&self) -> impl Iterator<Item = (AnimalId, &Birth)> + '_ {
        self.outcomes.iter().filter_map(|(id, outcome)| match outcome {
            StepOutcome::Reproduced(birth) => Some((*id, birth)),
            _ => None,
        })
    }
}
