use std::collections::HashSet;

use log::debug;
use rand::{seq::SliceRandom, Rng};

use crate::grid::{Cell, Grid};

/// Random draws tried before falling back to scanning for free cells.
const MAX_SAMPLES: usize = 64;

/// Picks a free cell for the next food item, or `None` when every cell is
/// occupied.
pub fn place<R: Rng>(grid: &Grid, occupied: &HashSet<Cell>, rng: &mut R) -> Option<Cell> {
    if occupied.len() < grid.cell_count() {
        for _ in 0..MAX_SAMPLES {
            let cell = Cell::new(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
            if !occupied.contains(&cell) {
                return Some(cell);
            }
        }
    }

    debug!("Sampling did not find a free cell, scanning {} cells", grid.cell_count());
    let choices: Vec<Cell> = grid.cells().filter(|cell| !occupied.contains(cell)).collect();
    choices.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn never_lands_on_an_occupied_cell() {
        let grid = Grid::with_cells(4, 4).unwrap();
        let occupied: HashSet<Cell> = (0..4).map(|col| Cell::new(col, 2)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let cell = place(&grid, &occupied, &mut rng).unwrap();
            assert!(grid.contains(cell));
            assert!(!occupied.contains(&cell));
        }
    }

    #[test]
    fn finds_the_last_free_cell() {
        let grid = Grid::with_cells(5, 5).unwrap();
        let free = Cell::new(3, 1);
        let occupied: HashSet<Cell> = grid.cells().filter(|c| *c != free).collect();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(place(&grid, &occupied, &mut rng), Some(free));
    }

    #[test]
    fn full_grid_has_no_target() {
        let grid = Grid::with_cells(3, 3).unwrap();
        let occupied: HashSet<Cell> = grid.cells().collect();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(place(&grid, &occupied, &mut rng), None);
    }
}
