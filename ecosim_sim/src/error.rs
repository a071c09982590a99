// Typed errors for the simulation library.
//
// Steady-state ticking never fails. Errors only arise at the edges: reading
// a terrain map, parsing config, or dispatching a spawn for a species the
// config does not describe. A failed path search is not an error; it is the
// normal "no route" outcome and is handled by leaving the movement queue
// empty.

use crate::types::{GridCoord, Species};
use thiserror::Error;

/// Everything that can go wrong while building or driving a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown terrain code {code} at ({col}, {row})")]
    UnknownTerrainCode { code: u8, col: usize, row: usize },

    #[error("unknown species tag {0:?}")]
    UnknownSpeciesTag(String),

    #[error("species {0} has no entry in the species table")]
    UnconfiguredSpecies(Species),

    #[error("map has no cells")]
    EmptyMap,

    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot spawn a {species} with a {genome} genome")]
    GenomeSpeciesMismatch { species: Species, genome: Species },

    #[error("position {0} is outside the grid")]
    OutOfBounds(GridCoord),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
