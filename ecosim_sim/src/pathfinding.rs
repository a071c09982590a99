// A* pathfinding over the terrain grid.
//
// Standard A* with a Manhattan-distance heuristic over 4-connected cells and
// uniform step cost 1. The open set is a `BinaryHeap` turned into a min-heap
// by reversed ordering. Scores and came-from links live in `Vec`s indexed by
// flat cell index, sized to the whole grid up front; unvisited cells score
// `u32::MAX` (infinity).
//
// Passability: any non-water cell may be expanded. The goal cell is always
// expandable even when it is water, so animals can path *into* a pond to
// drink or onto a target standing in one. No other cell gets that exemption.
//
// Ties between equal f-scores go to the entry pushed first (a monotonic
// insertion counter is the secondary key), so the result is a pure function
// of `(grid, start, goal)`. A cell already waiting in the open set is not
// pushed again when its score improves; its g-score is still relaxed.
//
// The returned route excludes `start` and includes `goal`. `start == goal`
// yields `[goal]`; an unreachable goal yields an empty route, which callers
// treat as "no route this tick" rather than an error.
//
// See also: `grid.rs` for the grid being searched, `behavior.rs` which calls
// `find_path` whenever an animal picks a target or replans a chase.

use crate::grid::Grid;
use crate::types::{GridCoord, ORTHOGONAL_STEPS};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    f_score: u32,
    /// Insertion order; earlier entries win ties.
    sequence: u64,
    cell: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.sequence == other.sequence
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest (f_score, sequence) is "greatest".
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Find a shortest route from `start` to `goal`.
///
/// Returns the cells to step through, excluding `start` and including
/// `goal`. Empty if `goal` cannot be reached or either endpoint is off the
/// grid.
pub fn find_path(grid: &Grid, start: GridCoord, goal: GridCoord) -> Vec<GridCoord> {
    if start == goal {
        return vec![goal];
    }
    let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };

    let n = grid.area();
    let mut g_score = vec![u32::MAX; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut in_open = vec![false; n];

    g_score[start_idx] = 0;

    let mut sequence = 0u64;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        f_score: start.manhattan_distance(goal),
        sequence,
        cell: start_idx,
    });
    in_open[start_idx] = true;

    while let Some(current) = open.pop() {
        let ci = current.cell;
        in_open[ci] = false;

        if ci == goal_idx {
            return reconstruct_path(grid, &came_from, start_idx, goal_idx);
        }

        let current_coord = grid.coord_of(ci);
        let tentative_g = g_score[ci] + 1;

        for neighbor in neighbors(grid, current_coord, goal) {
            // `neighbors` only yields in-bounds cells.
            let Some(ni) = grid.index(neighbor) else {
                continue;
            };
            if tentative_g < g_score[ni] {
                came_from[ni] = Some(ci);
                g_score[ni] = tentative_g;
                if !in_open[ni] {
                    sequence += 1;
                    open.push(OpenEntry {
                        f_score: tentative_g + neighbor.manhattan_distance(goal),
                        sequence,
                        cell: ni,
                    });
                    in_open[ni] = true;
                }
            }
        }
    }

    Vec::new()
}

/// In-bounds 4-neighbors of `cell` that may be entered: anything but water,
/// plus `goal` unconditionally. Yielded in up/right/down/left order.
fn neighbors(grid: &Grid, cell: GridCoord, goal: GridCoord) -> SmallVec<[GridCoord; 4]> {
    ORTHOGONAL_STEPS
        .iter()
        .map(|&(dc, dr)| cell.offset(dc, dr))
        .filter(|&n| grid.in_bounds(n) && (n == goal || !grid.is_water(n)))
        .collect()
}

/// Walk `came_from` back from the goal; the start cell itself is dropped.
fn reconstruct_path(
    grid: &Grid,
    came_from: &[Option<usize>],
    start: usize,
    goal: usize,
) -> Vec<GridCoord> {
    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(grid.coord_of(current));
        match came_from[current] {
            Some(prev) => current = prev,
            None => break,
        }
    }
    cells.reverse();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Terrain;

    fn grid_with_water(width: usize, height: usize, water: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(width, height);
        for &(c, r) in water {
            grid.set(GridCoord::new(c, r), Terrain::Water);
        }
        grid
    }

    /// Every step must be a single orthogonal move.
    fn assert_contiguous(start: GridCoord, path: &[GridCoord]) {
        let mut prev = start;
        for &cell in path {
            assert_eq!(prev.manhattan_distance(cell), 1, "jump from {prev} to {cell}");
            prev = cell;
        }
    }

    #[test]
    fn same_start_and_goal() {
        let grid = Grid::new(3, 3);
        let s = GridCoord::new(1, 1);
        assert_eq!(find_path(&grid, s, s), vec![s]);
    }

    #[test]
    fn open_grid_path_length_is_manhattan() {
        let grid = Grid::new(12, 9);
        let pairs = [
            ((0, 0), (11, 8)),
            ((5, 5), (0, 0)),
            ((3, 7), (3, 1)),
            ((10, 2), (1, 2)),
        ];
        for ((sc, sr), (ec, er)) in pairs {
            let (s, e) = (GridCoord::new(sc, sr), GridCoord::new(ec, er));
            let path = find_path(&grid, s, e);
            assert_eq!(path.len() as u32, s.manhattan_distance(e));
            assert_eq!(path.last(), Some(&e));
            assert!(!path.contains(&s), "start must be excluded");
            assert_contiguous(s, &path);
        }
    }

    #[test]
    fn routes_around_single_pond() {
        let grid = grid_with_water(5, 5, &[(2, 2)]);
        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(4, 4);
        let path = find_path(&grid, start, goal);
        assert_eq!(path.len(), 8);
        assert!(!path.contains(&GridCoord::new(2, 2)));
        assert_contiguous(start, &path);
    }

    #[test]
    fn never_crosses_water_except_at_goal() {
        // A wall of water with a single gap at the bottom.
        let water: Vec<(i32, i32)> = (0..5).map(|r| (3, r)).collect();
        let grid = grid_with_water(7, 6, &water);
        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(6, 0);
        let path = find_path(&grid, start, goal);
        assert!(!path.is_empty());
        assert!(path.iter().all(|&c| !grid.is_water(c)));
        assert!(path.contains(&GridCoord::new(3, 5)), "must use the gap");
        assert_contiguous(start, &path);
    }

    #[test]
    fn water_goal_is_reachable() {
        let grid = grid_with_water(4, 4, &[(2, 1), (3, 1)]);
        let start = GridCoord::new(0, 1);
        let goal = GridCoord::new(3, 1);
        let path = find_path(&grid, start, goal);
        assert_eq!(path.last(), Some(&goal));
        // Only the final cell may be water.
        assert!(path[..path.len() - 1].iter().all(|&c| !grid.is_water(c)));
    }

    #[test]
    fn disconnected_goal_yields_empty_path() {
        // Goal (0,0) is grass but boxed in by water on both open sides.
        let grid = grid_with_water(4, 4, &[(1, 0), (0, 1), (1, 1)]);
        let path = find_path(&grid, GridCoord::new(3, 3), GridCoord::new(0, 0));
        assert!(path.is_empty());
    }

    #[test]
    fn off_grid_goal_yields_empty_path() {
        let grid = Grid::new(3, 3);
        assert!(find_path(&grid, GridCoord::new(0, 0), GridCoord::new(5, 5)).is_empty());
    }

    #[test]
    fn deterministic() {
        let grid = grid_with_water(20, 20, &[(5, 5), (5, 6), (6, 5), (12, 3), (3, 12)]);
        let s = GridCoord::new(1, 2);
        let e = GridCoord::new(18, 17);
        let first = find_path(&grid, s, e);
        for _ in 0..5 {
            assert_eq!(find_path(&grid, s, e), first);
        }
    }
}
