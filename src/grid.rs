use std::fmt;

use crate::error::{Result, SnakeError};
use Direction::*;

/// A position on the playfield, in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Cell { col, row }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Cell { col: self.col + dx, row: self.row + dy }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Down, Left, Right];

    /// Unit step on the grid, with rows growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

/// Toroidal playfield measured in pixels, split into square cells of
/// `cell_size` pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cell_size: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32, cell_size: i32) -> Result<Self> {
        let valid = cell_size > 0
            && width >= cell_size
            && height >= cell_size
            && width % cell_size == 0
            && height % cell_size == 0;

        if !valid {
            return Err(SnakeError::InvalidGrid { width, height, cell_size });
        }

        Ok(Grid { width, height, cell_size })
    }

    /// Grid of `cols` x `rows` cells of size one.
    pub fn with_cells(cols: i32, rows: i32) -> Result<Self> {
        Grid::new(cols, rows, 1)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn cols(&self) -> i32 {
        self.width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cols() as usize * self.rows() as usize
    }

    /// Maps a pixel coordinate that overshot an edge by at most one cell back
    /// onto the playfield.
    pub fn wrap(&self, x: i32, y: i32) -> (i32, i32) {
        let x = if x < 0 {
            self.width - self.cell_size
        } else if x >= self.width {
            0
        } else {
            x
        };

        let y = if y < 0 {
            self.height - self.cell_size
        } else if y >= self.height {
            0
        } else {
            y
        };

        (x, y)
    }

    pub fn wrap_cell(&self, cell: Cell) -> Cell {
        let (x, y) = self.to_pixels(cell);
        let (x, y) = self.wrap(x, y);
        Cell::new(x / self.cell_size, y / self.cell_size)
    }

    /// The cell one step away in `direction`, wrapping around the edges.
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        self.wrap_cell(cell.offset(dx, dy))
    }

    /// Which single step leads from `from` to `to`, if they are neighbours.
    /// Cells on opposite edges count as neighbours.
    pub fn direction_between(&self, from: Cell, to: Cell) -> Option<Direction> {
        Direction::ALL.iter().copied().find(|&dir| self.step(from, dir) == to)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.cols()).contains(&cell.col) && (0..self.rows()).contains(&cell.row)
    }

    pub fn to_pixels(&self, cell: Cell) -> (i32, i32) {
        (cell.col * self.cell_size, cell.row * self.cell_size)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (cols, rows) = (self.cols(), self.rows());
        (0..rows).flat_map(move |row| (0..cols).map(move |col| Cell::new(col, row)))
    }
}
