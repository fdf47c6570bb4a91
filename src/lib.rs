pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod layout;
pub mod score;
pub mod session;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);

pub use clock::{GameClock, Phase};
pub use engine::{tick, GameState, Rules, TickOutcome};
pub use error::{Result, SnakeError};
pub use grid::{Cell, Direction, Grid};
pub use session::{Session, Snapshot};
