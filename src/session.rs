//! A run of the game and everything it owns, driven one render frame at a
//! time.

use std::{collections::HashSet, time::Duration};

use log::{debug, info};
use rand::Rng;

use crate::clock::{GameClock, Phase};
use crate::engine::{self, GameState, Rules, TickOutcome};
use crate::error::Result;
use crate::food;
use crate::grid::{Cell, Direction, Grid};
use crate::input::Action;
use crate::layout;
use crate::score::{HighScore, KeyValueStore};
use crate::snake::SegmentShape;

/// Read-only view of a run for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub grid: Grid,
    pub snake: Vec<Cell>,
    pub shapes: Vec<SegmentShape>,
    pub food: Option<Cell>,
    pub score: u32,
    pub high_score: u32,
    pub phase: Phase,
    /// Number of simulation steps taken this run.
    pub ticks: u64,
}

impl Snapshot {
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

pub struct Session<R: Rng, S: KeyValueStore> {
    grid: Grid,
    rules: Rules,
    state: GameState,
    clock: GameClock,
    high_score: HighScore<S>,
    rng: R,
    ticks: u64,
}

impl<R: Rng, S: KeyValueStore> Session<R, S> {
    pub fn new(grid: Grid, rules: Rules, mut rng: R, store: S) -> Result<Self> {
        rules.validate()?;
        let state = GameState::new(&grid, &rules, &mut rng);
        let high_score = HighScore::load(store);
        info!("New run on {}x{} grid, high score {}", grid.cols(), grid.rows(), high_score.best());

        Ok(Session {
            grid,
            rules,
            state,
            clock: GameClock::new(rules.initial_step),
            high_score,
            rng,
            ticks: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for setting up positions.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn handle(&mut self, action: Action) {
        match action {
            Action::Turn(dir) => self.turn(dir),
            Action::TogglePause => {
                self.clock.toggle_pause();
            }
            Action::Resume => self.clock.resume(),
            Action::Restart => {
                if self.clock.is_over() {
                    self.restart();
                }
            }
            Action::PauseOrRestart => {
                if self.clock.is_over() {
                    self.restart();
                } else {
                    self.clock.toggle_pause();
                }
            }
            Action::Quit => {}
        }
    }

    /// Queues a turn. Ignored while paused or after the run ended.
    pub fn turn(&mut self, dir: Direction) {
        if !self.clock.is_running() {
            debug!("Dropping {:?} while {:?}", dir, self.clock.phase());
            return;
        }
        self.state.input.enqueue(dir);
    }

    /// Called once per render frame with the real time since the previous
    /// frame. Runs at most one simulation step.
    pub fn frame(&mut self, elapsed: Duration) -> Option<TickOutcome> {
        if !self.clock.advance(elapsed) {
            return None;
        }

        Some(self.step())
    }

    /// Runs one simulation step regardless of the clock's accumulator.
    pub fn step(&mut self) -> TickOutcome {
        let outcome = engine::tick(
            &mut self.state,
            &mut self.clock,
            &self.grid,
            &self.rules,
            &mut self.rng,
        );

        if outcome != TickOutcome::Halted {
            self.ticks += 1;
        }
        if outcome.ends_run() {
            info!(
                "Run over ({:?}) after {} ticks, score {}",
                outcome, self.ticks, self.state.score
            );
            self.high_score.submit(self.state.score);
        }

        outcome
    }

    /// Throws the current run away and starts a fresh one.
    pub fn restart(&mut self) {
        self.state = GameState::new(&self.grid, &self.rules, &mut self.rng);
        self.clock = GameClock::new(self.rules.initial_step);
        self.high_score.reload();
        self.ticks = 0;
        info!("Restarted, high score {}", self.high_score.best());
    }

    /// Moves the run onto `grid`, shifting the snake and food so they stay
    /// centred. A finished run keeps its final positions.
    pub fn resize(&mut self, grid: Grid) {
        if grid == self.grid {
            return;
        }

        if self.clock.is_over() {
            info!("Resized to {}x{} after game over", grid.cols(), grid.rows());
            self.grid = grid;
            return;
        }

        let (dx, dy) = layout::recentre_offset(&self.grid, &grid);
        info!(
            "Resizing {}x{} -> {}x{}, offset ({}, {})",
            self.grid.cols(),
            self.grid.rows(),
            grid.cols(),
            grid.rows(),
            dx,
            dy
        );
        self.grid = grid;
        self.state.snake.translate(dx, dy, &grid);

        let occupied: HashSet<Cell> = self.state.snake.body().iter().copied().collect();
        let food = self
            .state
            .food
            .map(|f| {
                Cell::new(
                    (f.col + dx).rem_euclid(grid.cols()),
                    (f.row + dy).rem_euclid(grid.rows()),
                )
            })
            .filter(|f| !occupied.contains(f));

        self.state.food = match food {
            Some(cell) => Some(cell),
            None => food::place(&grid, &occupied, &mut self.rng),
        };
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            snake: self.state.snake.body().iter().copied().collect(),
            shapes: self.state.snake.shapes(&self.grid, self.state.direction),
            food: self.state.food,
            score: self.state.score,
            high_score: self.high_score.best(),
            phase: self.clock.phase(),
            ticks: self.ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction::*;
    use crate::score::MemoryStore;
    use crate::snake::Snake;
    use rand::{rngs::StdRng, SeedableRng};

    fn session(cols: i32, rows: i32) -> Session<StdRng, MemoryStore> {
        let grid = Grid::with_cells(cols, rows).unwrap();
        let rng = StdRng::seed_from_u64(11);
        Session::new(grid, Rules::default(), rng, MemoryStore::new()).unwrap()
    }

    #[test]
    fn refuses_bad_rules() {
        let grid = Grid::with_cells(20, 10).unwrap();
        let rules = Rules { speed_interval: 0, ..Rules::default() };
        let rng = StdRng::seed_from_u64(11);
        assert!(Session::new(grid, rules, rng, MemoryStore::new()).is_err());
    }

    #[test]
    fn starts_running_at_quarter_width() {
        let s = session(20, 10);
        let snap = s.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.snake, vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]);
        assert!(snap.food.is_some());
        assert!(!snap.snake.contains(&snap.food.unwrap()));
    }

    #[test]
    fn turns_ignored_while_paused() {
        let mut s = session(20, 10);
        s.handle(Action::TogglePause);
        s.handle(Action::Turn(Up));
        assert!(s.state().input.is_empty());

        s.handle(Action::Resume);
        s.handle(Action::Turn(Up));
        assert_eq!(s.state().input.len(), 1);
    }

    #[test]
    fn paused_frames_do_not_tick() {
        let mut s = session(20, 10);
        s.handle(Action::PauseOrRestart);
        assert_eq!(s.frame(Duration::from_secs(5)), None);
        assert_eq!(s.snapshot().ticks, 0);
    }

    #[test]
    fn restart_only_after_game_over() {
        let mut s = session(20, 10);
        s.handle(Action::Restart);
        assert_eq!(s.phase(), Phase::Running);

        s.state_mut().snake = Snake::from_cells(vec![
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
            Cell::new(4, 6),
        ])
        .unwrap();
        s.state_mut().direction = Down;
        s.state_mut().food = Some(Cell::new(0, 0));
        assert_eq!(s.step(), TickOutcome::Crashed);

        s.handle(Action::PauseOrRestart);
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.snapshot().snake.len(), 3);
    }

    #[test]
    fn resize_keeps_snake_centred() {
        let mut s = session(20, 10);
        let before = s.snapshot().snake;
        s.resize(Grid::with_cells(30, 14).unwrap());

        let after = s.snapshot();
        let expected: Vec<Cell> = before.iter().map(|c| c.offset(5, 2)).collect();
        assert_eq!(after.snake, expected);
        assert!(after.snake.iter().all(|c| after.grid.contains(*c)));
        assert!(after.grid.contains(after.food.unwrap()));
    }

    fn frozen(s: &Session<StdRng, MemoryStore>) -> (Vec<Cell>, Option<Cell>, u32, Phase) {
        let snap = s.snapshot();
        (snap.snake, snap.food, snap.score, snap.phase)
    }

    #[test]
    fn resize_after_crash_leaves_the_run_alone() {
        let mut s = session(20, 10);
        s.state_mut().snake = Snake::from_cells(vec![
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
        ])
        .unwrap();
        s.state_mut().direction = Down;
        s.state_mut().food = Some(Cell::new(0, 0));
        assert_eq!(s.step(), TickOutcome::Crashed);

        let before = frozen(&s);
        let bigger = Grid::with_cells(30, 14).unwrap();
        s.resize(bigger);

        assert_eq!(frozen(&s), before);
        assert_eq!(*s.grid(), bigger);
    }

    #[test]
    fn resize_after_filling_the_grid_keeps_the_win() {
        let mut s = session(3, 1);
        s.state_mut().snake = Snake::from_cells(vec![Cell::new(1, 0), Cell::new(0, 0)]).unwrap();
        s.state_mut().direction = Right;
        s.state_mut().food = Some(Cell::new(2, 0));
        assert_eq!(s.step(), TickOutcome::Filled);

        let before = frozen(&s);
        s.resize(Grid::with_cells(9, 5).unwrap());

        assert_eq!(frozen(&s), before);
        assert_eq!(s.snapshot().food, None);
    }
}
