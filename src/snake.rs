use std::collections::VecDeque;

use crate::grid::{Cell, Direction::{self, *}, Grid};
use SegmentShape::*;

/// How a single segment is drawn. Corner names give the two sides of the
/// cell the segment connects.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentShape {
    Head(Direction),
    Tail(Direction),
    Vertical,
    Horizontal,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// Lays out `size` segments behind `head`, opposite to `direction`.
    pub fn new(head: Cell, size: usize, direction: Direction, grid: &Grid) -> Self {
        let mut body = VecDeque::with_capacity(size.max(1));
        let mut pos = grid.wrap_cell(head);
        body.push_back(pos);

        for _ in 1..size {
            pos = grid.step(pos, direction.opposite());
            body.push_back(pos);
        }

        Snake { body }
    }

    /// Builds a snake from explicit cells, head first. `None` when empty.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Option<Self> {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        if body.is_empty() {
            None
        } else {
            Some(Snake { body })
        }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// True when `cell` lands on any segment behind the head.
    pub fn hits_body(&self, cell: Cell) -> bool {
        self.body.iter().skip(1).any(|&c| c == cell)
    }

    /// Moves the head to `new_head`. Returns the vacated tail cell unless the
    /// snake grew.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Shifts every segment by `(dx, dy)` cells, folding the result back onto
    /// `grid`.
    pub fn translate(&mut self, dx: i32, dy: i32, grid: &Grid) {
        let (cols, rows) = (grid.cols(), grid.rows());
        for cell in self.body.iter_mut() {
            *cell = Cell::new((cell.col + dx).rem_euclid(cols), (cell.row + dy).rem_euclid(rows));
        }
    }

    /// Shape of each segment, head first. `heading` is used for the head.
    pub fn shapes(&self, grid: &Grid, heading: Direction) -> Vec<SegmentShape> {
        let len = self.body.len();
        let mut shapes = Vec::with_capacity(len);
        shapes.push(Head(heading));

        for i in 1..len {
            let current = self.body[i];
            let toward_head = grid.direction_between(current, self.body[i - 1]);

            if i == len - 1 {
                let facing = toward_head.map(Direction::opposite).unwrap_or(heading);
                shapes.push(Tail(facing));
                continue;
            }

            let toward_tail = grid.direction_between(current, self.body[i + 1]);
            let shape = match (toward_head, toward_tail) {
                (Some(a), Some(b)) => body_shape(a, b),
                _ => Horizontal,
            };
            shapes.push(shape);
        }

        shapes
    }
}

/// Shape of a body segment whose neighbours lie in `toward_head` and
/// `toward_tail`.
pub fn body_shape(toward_head: Direction, toward_tail: Direction) -> SegmentShape {
    match (toward_head, toward_tail) {
        (Up, Down) | (Down, Up) => Vertical,
        (Left, Right) | (Right, Left) => Horizontal,
        (Up, Left) | (Left, Up) => TopLeft,
        (Up, Right) | (Right, Up) => TopRight,
        (Down, Left) | (Left, Down) => BottomLeft,
        (Down, Right) | (Right, Down) => BottomRight,
        // Both neighbours on one side only happens on a corrupt body
        (a, _) if a.is_vertical() => Vertical,
        _ => Horizontal,
    }
}
