// Dense 2D terrain grid and map interpretation.
//
// The grid is stored as a flat `Vec<Terrain>` indexed by `col + row * width`,
// giving O(1) reads. It is immutable for the duration of a simulation run:
// water is never filled in, and berry bushes are not consumed when eaten.
// Out-of-bounds reads return `None` from `get()`; `is_water()` treats
// out-of-bounds as not-water, so callers must check `in_bounds()` before
// stepping anywhere.
//
// Maps arrive as rows of terrain codes (the map generator and any map file
// format live outside this crate). `MapLayout::from_codes` interprets them:
//
//   0 berry bush     2 grass     5 water
//   1 carnivore den  3 herbivore den  4 omnivore den
//
// Dens are grass cells that additionally spawn one animal of their species
// when the world is built (see `SimState::new`). Any other code is rejected
// with `SimError::UnknownTerrainCode`.
//
// See also: `pathfinding.rs` which searches this grid, `behavior.rs` for the
// water/berry window scans, `sim.rs` which owns the grid.

use crate::error::SimError;
use crate::types::{GridCoord, Species, Terrain};

/// Terrain code for a berry bush.
pub const CODE_BERRY: u8 = 0;
/// Terrain code for a carnivore den.
pub const CODE_CARNIVORE: u8 = 1;
/// Terrain code for plain grass.
pub const CODE_GRASS: u8 = 2;
/// Terrain code for a herbivore den.
pub const CODE_HERBIVORE: u8 = 3;
/// Terrain code for an omnivore den.
pub const CODE_OMNIVORE: u8 = 4;
/// Terrain code for water.
pub const CODE_WATER: u8 = 5;

/// Dense 2D terrain grid.
#[derive(Clone, Debug)]
pub struct Grid {
    /// Flat storage: index = col + row * width.
    cells: Vec<Terrain>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid filled with grass.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Terrain::Grass; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && (coord.col as usize) < self.width
            && (coord.row as usize) < self.height
    }

    /// Flat index of a cell. `None` if out of bounds.
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.col as usize + coord.row as usize * self.width)
        } else {
            None
        }
    }

    /// Inverse of `index`.
    pub fn coord_of(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, coord: GridCoord) -> Option<Terrain> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Overwrite a cell. No-op out of bounds. Used while assembling a map;
    /// the simulation itself never mutates terrain.
    pub fn set(&mut self, coord: GridCoord, terrain: Terrain) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = terrain;
        }
    }

    /// True only for in-bounds water cells.
    pub fn is_water(&self, coord: GridCoord) -> bool {
        self.get(coord).is_some_and(Terrain::is_water)
    }

    /// Clamp a coordinate onto the grid.
    pub fn clamp(&self, coord: GridCoord) -> GridCoord {
        GridCoord::new(
            coord.col.clamp(0, self.width as i32 - 1),
            coord.row.clamp(0, self.height as i32 - 1),
        )
    }
}

/// A parsed map: the terrain grid plus the dens to populate it from.
#[derive(Clone, Debug)]
pub struct MapLayout {
    pub grid: Grid,
    /// Spawn points in row-major order.
    pub dens: Vec<(Species, GridCoord)>,
}

impl MapLayout {
    /// Interpret rows of terrain codes. All rows must have the same length.
    pub fn from_codes<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, SimError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if height == 0 || width == 0 {
            return Err(SimError::EmptyMap);
        }

        let mut grid = Grid::new(width, height);
        let mut dens = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(SimError::RaggedMap {
                    row: row_index,
                    expected: width,
                    found: row.len(),
                });
            }
            for (col_index, &code) in row.iter().enumerate() {
                let coord = GridCoord::new(col_index as i32, row_index as i32);
                let terrain = match code {
                    CODE_BERRY => Terrain::Berry,
                    CODE_GRASS => Terrain::Grass,
                    CODE_WATER => Terrain::Water,
                    CODE_CARNIVORE => {
                        dens.push((Species::Carnivore, coord));
                        Terrain::Grass
                    }
                    CODE_HERBIVORE => {
                        dens.push((Species::Herbivore, coord));
                        Terrain::Grass
                    }
                    CODE_OMNIVORE => {
                        dens.push((Species::Omnivore, coord));
                        Terrain::Grass
                    }
                    code => {
                        return Err(SimError::UnknownTerrainCode {
                            code,
                            col: col_index,
                            row: row_index,
                        });
                    }
                };
                grid.set(coord, terrain);
            }
        }

        Ok(Self { grid, dens })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_dens() {
        let layout = MapLayout::from_codes(&[[2u8, 0, 5], [3, 1, 4]]).unwrap();
        let grid = &layout.grid;
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.get(GridCoord::new(1, 0)), Some(Terrain::Berry));
        assert!(grid.is_water(GridCoord::new(2, 0)));
        // Dens are grass underneath.
        assert_eq!(grid.get(GridCoord::new(0, 1)), Some(Terrain::Grass));
        assert_eq!(
            layout.dens,
            vec![
                (Species::Herbivore, GridCoord::new(0, 1)),
                (Species::Carnivore, GridCoord::new(1, 1)),
                (Species::Omnivore, GridCoord::new(2, 1)),
            ]
        );
    }

    #[test]
    fn rejects_unknown_code() {
        let err = MapLayout::from_codes(&[vec![2u8, 2], vec![2, 9]]).unwrap_err();
        assert!(matches!(
            err,
            SimError::UnknownTerrainCode { code: 9, col: 1, row: 1 }
        ));
    }

    #[test]
    fn rejects_ragged_and_empty_maps() {
        assert!(matches!(
            MapLayout::from_codes(&[vec![2u8, 2], vec![2]]),
            Err(SimError::RaggedMap { row: 1, expected: 2, found: 1 })
        ));
        let empty: [Vec<u8>; 0] = [];
        assert!(matches!(MapLayout::from_codes(&empty), Err(SimError::EmptyMap)));
    }

    #[test]
    fn out_of_bounds_is_not_water() {
        let grid = Grid::new(2, 2);
        assert_eq!(grid.get(GridCoord::new(-1, 0)), None);
        assert!(!grid.is_water(GridCoord::new(5, 5)));
        assert_eq!(grid.index(GridCoord::new(2, 0)), None);
    }

    #[test]
    fn index_roundtrip() {
        let grid = Grid::new(4, 3);
        for i in 0..grid.area() {
            assert_eq!(grid.index(grid.coord_of(i)), Some(i));
        }
    }
}
