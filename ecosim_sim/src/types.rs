// Core types shared across the simulation.
//
// Defines grid coordinates (`GridCoord`), pixel-space positions (`PixelPos`),
// animal identity (`AnimalKey`, `AnimalId`), the `Species` enum, and the
// terrain classification of a grid cell (`Terrain`).
//
// Identity is species-scoped: every species has its own monotonic key
// counter in the population registry (see `population.rs`), so an `AnimalId`
// is the pair `(species, key)`. Keys are never reused while a simulation is
// alive, which makes an `AnimalId` safe to hold as a cross-entity reference:
// a stale id simply fails the liveness lookup.
//
// **Critical constraint: determinism.** All types here are plain values with
// a total order, so they can key `BTreeMap`s and drive deterministic scans.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell of the terrain grid, addressed as (column, row).
///
/// Ordering is row-major (`row` first, then `col`) so that sorting cells
/// matches the scan order used by the resource searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub col: i32,
    pub row: i32,
}

impl GridCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance between two cells.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.col - other.col).unsigned_abs() + (self.row - other.row).unsigned_abs()
    }

    /// Chebyshev (king-move) distance between two cells. A cell lies inside
    /// the square search window of half-width `k` around `self` iff this is
    /// at most `k`.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        (self.col - other.col)
            .unsigned_abs()
            .max((self.row - other.row).unsigned_abs())
    }

    /// The cell offset by `(dcol, drow)`. May lie outside the grid.
    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        Self::new(self.col + dcol, self.row + drow)
    }

    /// Top-left pixel of this cell at the given tile size.
    pub const fn to_pixel(self, tile_size: i32) -> PixelPos {
        PixelPos::new(self.col * tile_size, self.row * tile_size)
    }
}

/// Orthogonal unit steps in the fixed order up, right, down, left. Shared by
/// A* neighbor expansion and the random walk.
pub const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

impl Ord for GridCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for GridCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// A position in screen space. Animals live on whole tiles, so a pixel
/// position is always `tile_size` times a grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The grid cell containing this pixel. Inverse of `GridCoord::to_pixel`
    /// for tile-aligned positions.
    pub const fn to_grid(self, tile_size: i32) -> GridCoord {
        GridCoord::new(self.x.div_euclid(tile_size), self.y.div_euclid(tile_size))
    }
}

// ---------------------------------------------------------------------------
// Species and identity
// ---------------------------------------------------------------------------

/// The closed set of animal species.
///
/// Serialized as its short tag (`"herbi"`, `"carni"`, `"omni"`), so config
/// files key the species table by tag; full lowercase names are also
/// accepted on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Species {
    Herbivore,
    Carnivore,
    Omnivore,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Herbivore, Species::Carnivore, Species::Omnivore];

    /// Short tag used in map legends and external reports.
    pub const fn tag(self) -> &'static str {
        match self {
            Species::Herbivore => "herbi",
            Species::Carnivore => "carni",
            Species::Omnivore => "omni",
        }
    }

    /// Parse a species from its short tag or full lowercase name.
    pub fn from_tag(tag: &str) -> Result<Self, SimError> {
        match tag {
            "herbi" | "herbivore" => Ok(Species::Herbivore),
            "carni" | "carnivore" => Ok(Species::Carnivore),
            "omni" | "omnivore" => Ok(Species::Omnivore),
            other => Err(SimError::UnknownSpeciesTag(other.to_string())),
        }
    }
}

impl From<Species> for String {
    fn from(species: Species) -> Self {
        species.tag().to_string()
    }
}

impl TryFrom<String> for Species {
    type Error = SimError;

    fn try_from(tag: String) -> Result<Self, SimError> {
        Species::from_tag(&tag)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Species-scoped registry key. Monotonic per species, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimalKey(pub u64);

/// Full identity of an animal: its species table plus its key in that table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimalId {
    pub species: Species,
    pub key: AnimalKey,
}

impl AnimalId {
    pub const fn new(species: Species, key: AnimalKey) -> Self {
        Self { species, key }
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.species, self.key.0)
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// What occupies a grid cell, as far as the simulation cares.
///
/// Berry bushes are renewable: eating from one never changes the cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grass,
    Berry,
    Water,
}

impl Terrain {
    pub const fn is_water(self) -> bool {
        matches!(self, Terrain::Water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_conversion_roundtrips_on_tile_boundaries() {
        for tile in [1, 5, 16] {
            let cell = GridCoord::new(7, 3);
            let px = cell.to_pixel(tile);
            assert_eq!(px, PixelPos::new(7 * tile, 3 * tile));
            assert_eq!(px.to_grid(tile), cell);
        }
    }

    #[test]
    fn pixel_inside_a_tile_maps_to_that_tile() {
        assert_eq!(PixelPos::new(14, 9).to_grid(5), GridCoord::new(2, 1));
    }

    #[test]
    fn distances() {
        let a = GridCoord::new(0, 0);
        let b = GridCoord::new(3, -4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(a.chebyshev_distance(b), 4);
        assert_eq!(b.chebyshev_distance(a), 4);
    }

    #[test]
    fn grid_coord_orders_row_major() {
        let mut cells = vec![
            GridCoord::new(2, 1),
            GridCoord::new(0, 2),
            GridCoord::new(1, 1),
            GridCoord::new(5, 0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                GridCoord::new(5, 0),
                GridCoord::new(1, 1),
                GridCoord::new(2, 1),
                GridCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn species_tags_roundtrip() {
        for species in Species::ALL {
            assert_eq!(Species::from_tag(species.tag()).unwrap(), species);
        }
        assert!(matches!(
            Species::from_tag("dragon"),
            Err(SimError::UnknownSpeciesTag(tag)) if tag == "dragon"
        ));
    }

    #[test]
    fn species_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&Species::Omnivore).unwrap(), "\"omni\"");
        let parsed: Species = serde_json::from_str("\"carnivore\"").unwrap();
        assert_eq!(parsed, Species::Carnivore);
        let err = serde_json::from_str::<Species>("\"dragon\"").unwrap_err();
        assert!(err.to_string().contains("unknown species tag"), "{err}");
    }

    #[test]
    fn animal_id_display() {
        let id = AnimalId::new(Species::Carnivore, AnimalKey(12));
        assert_eq!(id.to_string(), "carni#12");
    }
}
