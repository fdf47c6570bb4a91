//! One fixed step of the simulation: steer, move, collide, eat, speed up.

use std::{collections::HashSet, time::Duration};

use log::{debug, info};
use rand::Rng;

use crate::clock::GameClock;
use crate::error::{Result, SnakeError};
use crate::food;
use crate::grid::{Cell, Direction, Grid};
use crate::input::InputBuffer;
use crate::snake::Snake;

/// Tuning for a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    pub initial_step: Duration,
    pub min_step: Duration,
    pub step_decrement: Duration,
    /// Speed up whenever the score is a multiple of this.
    pub speed_interval: u32,
    pub score_increment: u32,
    pub initial_length: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            initial_step: Duration::from_millis(100),
            min_step: Duration::from_millis(40),
            step_decrement: Duration::from_millis(5),
            speed_interval: 5,
            score_increment: 1,
            initial_length: 3,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<()> {
        if self.initial_step.is_zero() || self.min_step.is_zero() {
            return Err(SnakeError::Config("step durations must be non-zero".into()));
        }
        if self.min_step > self.initial_step {
            return Err(SnakeError::Config(format!(
                "minimum step {:?} exceeds initial step {:?}",
                self.min_step, self.initial_step
            )));
        }
        if self.speed_interval == 0 {
            return Err(SnakeError::Config("speed interval must be positive".into()));
        }
        if self.initial_length == 0 {
            return Err(SnakeError::Config("snake needs at least one segment".into()));
        }
        Ok(())
    }

    /// Step duration after reaching `score`, given the current `step`.
    pub fn next_step(&self, score: u32, step: Duration) -> Duration {
        if score > 0 && score % self.speed_interval == 0 && step > self.min_step {
            step.saturating_sub(self.step_decrement).max(self.min_step)
        } else {
            step
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate { score: u32, sped_up: bool },
    /// The head ran into the body. The run is over.
    Crashed,
    /// The snake covers every cell, so no food can be placed. The run is over.
    Filled,
    /// Tick requested after the run ended. Nothing changed.
    Halted,
}

impl TickOutcome {
    pub fn ends_run(self) -> bool {
        matches!(self, TickOutcome::Crashed | TickOutcome::Filled)
    }
}

/// Everything a run owns besides its clock.
pub struct GameState {
    pub snake: Snake,
    pub direction: Direction,
    pub food: Option<Cell>,
    pub score: u32,
    pub input: InputBuffer,
}

impl GameState {
    /// Fresh run: snake heading right from a quarter of the way across, half
    /// way down.
    pub fn new<R: Rng>(grid: &Grid, rules: &Rules, rng: &mut R) -> Self {
        let head = Cell::new(grid.cols() / 4, grid.rows() / 2);
        let length = rules.initial_length.min(grid.cols() as usize).max(1);
        let snake = Snake::new(head, length, Direction::Right, grid);
        Self::with_snake(snake, Direction::Right, grid, rng)
    }

    pub fn with_snake<R: Rng>(
        snake: Snake,
        direction: Direction,
        grid: &Grid,
        rng: &mut R,
    ) -> Self {
        let food = food::place(grid, &occupied(&snake), rng);
        GameState { snake, direction, food, score: 0, input: InputBuffer::new() }
    }
}

fn occupied(snake: &Snake) -> HashSet<Cell> {
    snake.body().iter().copied().collect()
}

/// Advances `state` by one step. Ends the run on `clock` when the snake
/// crashes or fills the grid, and shortens the clock's step on speed-ups.
pub fn tick<R: Rng>(
    state: &mut GameState,
    clock: &mut GameClock,
    grid: &Grid,
    rules: &Rules,
    rng: &mut R,
) -> TickOutcome {
    if clock.is_over() {
        return TickOutcome::Halted;
    }

    if let Some(dir) = state.input.dequeue_one() {
        if dir.is_opposite(state.direction) {
            debug!("Ignoring reversal {:?} while heading {:?}", dir, state.direction);
        } else {
            state.direction = dir;
        }
    }

    let new_head = grid.step(state.snake.head(), state.direction);

    if state.snake.hits_body(new_head) {
        info!("Crashed at {} with score {}", new_head, state.score);
        clock.end();
        return TickOutcome::Crashed;
    }

    if state.food != Some(new_head) {
        state.snake.advance(new_head, false);
        return TickOutcome::Moved;
    }

    state.snake.advance(new_head, true);
    state.score += rules.score_increment;

    let step = rules.next_step(state.score, clock.step());
    let sped_up = step != clock.step();
    if sped_up {
        info!("Score {} reached, step now {:?}", state.score, step);
        clock.set_step(step);
    }

    state.food = food::place(grid, &occupied(&state.snake), rng);
    if state.food.is_none() {
        info!("Snake fills the grid with score {}", state.score);
        clock.end();
        return TickOutcome::Filled;
    }

    TickOutcome::Ate { score: state.score, sped_up }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn speed_up_on_interval() {
        let rules = Rules::default();
        assert_eq!(rules.next_step(5, ms(100)), ms(95));
        assert_eq!(rules.next_step(6, ms(100)), ms(100));
        assert_eq!(rules.next_step(0, ms(100)), ms(100));
    }

    #[test]
    fn speed_up_respects_floor() {
        let rules = Rules::default();
        assert_eq!(rules.next_step(65, ms(40)), ms(40));
        assert_eq!(rules.next_step(10, ms(43)), ms(40));
    }

    #[test]
    fn validate_rejects_bad_rules() {
        assert!(Rules::default().validate().is_ok());
        let rules = Rules { min_step: ms(200), ..Rules::default() };
        assert!(rules.validate().is_err());
        let rules = Rules { speed_interval: 0, ..Rules::default() };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn reversal_is_ignored() {
        let grid = Grid::with_cells(10, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let snake =
            Snake::from_cells(vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]).unwrap();
        let mut state = GameState::with_snake(snake, Right, &grid, &mut rng);
        state.food = Some(Cell::new(0, 0));
        let mut clock = GameClock::new(ms(100));

        state.input.enqueue(Left);
        let outcome = tick(&mut state, &mut clock, &grid, &Rules::default(), &mut rng);

        assert_eq!(outcome, TickOutcome::Moved);
        assert_eq!(state.direction, Right);
        assert_eq!(state.snake.head(), Cell::new(6, 5));
    }

    #[test]
    fn one_buffered_turn_per_tick() {
        let grid = Grid::with_cells(10, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let snake = Snake::from_cells(vec![Cell::new(5, 5), Cell::new(4, 5)]).unwrap();
        let mut state = GameState::with_snake(snake, Right, &grid, &mut rng);
        state.food = Some(Cell::new(0, 0));
        let mut clock = GameClock::new(ms(100));
        let rules = Rules::default();

        state.input.enqueue(Up);
        state.input.enqueue(Left);
        tick(&mut state, &mut clock, &grid, &rules, &mut rng);
        assert_eq!(state.snake.head(), Cell::new(5, 4));
        tick(&mut state, &mut clock, &grid, &rules, &mut rng);
        assert_eq!(state.snake.head(), Cell::new(4, 4));
        assert!(state.input.is_empty());
    }

    #[test]
    fn filling_the_grid_ends_the_run() {
        let grid = Grid::with_cells(3, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let snake = Snake::from_cells(vec![Cell::new(1, 0), Cell::new(0, 0)]).unwrap();
        let mut state = GameState::with_snake(snake, Right, &grid, &mut rng);
        assert_eq!(state.food, Some(Cell::new(2, 0)));
        let mut clock = GameClock::new(ms(100));

        let outcome = tick(&mut state, &mut clock, &grid, &Rules::default(), &mut rng);
        assert_eq!(outcome, TickOutcome::Filled);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.food, None);
        assert!(clock.is_over());
    }
}
