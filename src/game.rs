use std::{io, thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermInt};
use crate::clock::Phase;
use crate::error::Result;
use crate::grid::{Cell, Direction::{self, *}, Grid};
use crate::input::{self, Action, SwipeTracker};
use crate::layout::Layout;
use crate::score::KeyValueStore;
use crate::session::{Session, Snapshot};
use crate::snake::SegmentShape::{self, *};
use crate::term::TermManager;

use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use crossterm::style::Color;
use log::{info, warn};
use rand::rngs::StdRng;

/// Each grid cell takes two terminal columns so it looks square.
const CELL_WIDTH: TermInt = 2;
/// Rows kept free above the playfield for the score line.
const HUD_ROWS: TermInt = 1;
/// Swipe threshold in half-rows: roughly three cells.
const SWIPE_THRESHOLD: i32 = 6;

const DARK_TILE: Color = Color::Rgb { r: 0x1a, g: 0xa6, b: 0x1a };
const LIGHT_TILE: Color = Color::Rgb { r: 0x00, g: 0xaa, b: 0x00 };
const SNAKE_COLOR: Color = Color::Black;
const APPLE_CHAR: char = 'O';
const APPLE_COLOR: Color = Color::Red;
const DEAD_SNAKE_CHAR: char = 'X';

pub struct SnakeGame<S: KeyValueStore> {
    term: TermManager,
    session: Session<StdRng, S>,
    layout: Layout,
    swipe: SwipeTracker,
    frame_interval: Duration,
    origin: Coords,
    last_drawn: Option<Snapshot>,
}

/// Whether the player asked to leave.
enum Flow {
    Continue,
    Quit,
}

impl<S: KeyValueStore> SnakeGame<S> {
    pub fn new(
        term: TermManager,
        make_session: impl FnOnce(Grid) -> Result<Session<StdRng, S>>,
        frame_interval: Duration,
    ) -> Result<Self> {
        let layout = terminal_layout();
        let (w, h) = term.get_terminal_size();
        let grid = fit(&layout, w, h)?;
        let session = make_session(grid)?;

        Ok(SnakeGame {
            term,
            session,
            layout,
            swipe: SwipeTracker::new(SWIPE_THRESHOLD),
            frame_interval,
            origin: (1, 1 + HUD_ROWS),
            last_drawn: None,
        })
    }

    pub fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys, WASD or mouse drag to move",
            "Space or P to pause",
            "Q or CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines);
        self.term.flush()?;

        let key = self.term.read_key_blocking()?;
        self.term.hide_message();
        Ok(!matches!(input::action_for_key(&key), Some(Action::Quit)))
    }

    /// Runs frames until the player quits.
    pub fn play(&mut self) -> Result<()> {
        self.redraw_all()?;
        let mut last_frame = Instant::now();

        loop {
            sleep(self.frame_interval);

            for ev in self.term.read_events_queue()? {
                if let Flow::Quit = self.on_event(ev)? {
                    info!("Player quit");
                    return Ok(());
                }
            }

            let now = Instant::now();
            self.session.frame(now - last_frame);
            last_frame = now;

            self.render()?;
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn on_event(&mut self, ev: Event) -> io::Result<Flow> {
        match ev {
            Event::Key(key) => match input::action_for_key(&key) {
                Some(Action::Quit) => return Ok(Flow::Quit),
                Some(action) => self.session.handle(action),
                None => {}
            },
            Event::Mouse(MouseEvent { kind, column, row, .. }) => {
                // Rows are about twice as tall as columns are wide
                let (x, y) = (column as i32, row as i32 * 2);
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => self.swipe.begin(x, y),
                    MouseEventKind::Up(MouseButton::Left) => {
                        if let Some(dir) = self.swipe.end(x, y) {
                            self.session.handle(Action::Turn(dir));
                        }
                    }
                    _ => {}
                }
            }
            Event::Resize(w, h) => self.on_resize(w, h)?,
            _ => {}
        }

        Ok(Flow::Continue)
    }

    fn on_resize(&mut self, w: TermInt, h: TermInt) -> io::Result<()> {
        // Mouse coordinates from before the resize no longer line up
        self.swipe.cancel();
        self.term.resize(w, h)?;
        match fit(&self.layout, w, h) {
            Ok(grid) => self.session.resize(grid),
            Err(e) => warn!("Keeping old playfield after resize to {}x{}: {}", w, h, e),
        }
        self.redraw_all()
    }

    fn redraw_all(&mut self) -> io::Result<()> {
        self.last_drawn = None;
        self.term.hide_message();
        self.term.clear()?;

        let grid = *self.session.grid();
        let (w, h) = self.term.get_terminal_size();
        let field = (grid.cols() as TermInt * CELL_WIDTH, grid.rows() as TermInt);
        self.origin = (
            (w.saturating_sub(field.0) / 2).max(1),
            (h.saturating_sub(field.1 + HUD_ROWS) / 2).max(1) + HUD_ROWS,
        );
        self.term.draw_borders(self.origin, field);
        self.render()
    }

    fn render(&mut self) -> io::Result<()> {
        let snap = self.session.snapshot();
        if self.last_drawn.as_ref() == Some(&snap) {
            return Ok(());
        }

        self.term.hide_message();
        self.draw_field(&snap);
        self.draw_hud(&snap);

        match snap.phase {
            Phase::Running => {}
            Phase::Paused => {
                self.term.show_message(&["Paused", "Space or P to resume", "Q to quit"])
            }
            Phase::GameOver => {
                let title = if snap.food.is_none() { "You won!" } else { "Game over!" };
                let score = format!("Score: {}", snap.score);
                let best = format!("High score: {}", snap.high_score);
                self.term.show_message(&[
                    title,
                    &score,
                    &best,
                    "",
                    "Space to play again,",
                    "or Q to quit.",
                ]);
            }
        }

        self.term.flush()?;
        self.last_drawn = Some(snap);
        Ok(())
    }

    fn draw_field(&mut self, snap: &Snapshot) {
        let grid = snap.grid;
        for cell in grid.cells() {
            self.put(cell, "  ", Color::Reset);
        }

        if let Some(apple) = snap.food {
            let glyph: String = [APPLE_CHAR, ' '].iter().collect();
            self.put(apple, &glyph, APPLE_COLOR);
        }

        let dead = snap.phase == Phase::GameOver && snap.food.is_some();
        for (cell, shape) in snap.snake.iter().zip(snap.shapes.iter()) {
            if dead {
                self.put(*cell, &DEAD_SNAKE_CHAR.to_string().repeat(2), SNAKE_COLOR);
            } else {
                self.put(*cell, shape_glyph(*shape), SNAKE_COLOR);
            }
        }
    }

    fn draw_hud(&mut self, snap: &Snapshot) {
        let line = format!("Score: {:<6} High score: {:<6}", snap.score, snap.high_score);
        let y = self.origin.1 - HUD_ROWS - 1;
        self.term.print_str((self.origin.0, y), &line);
    }

    fn put(&mut self, cell: Cell, glyph: &str, fg: Color) {
        let bg = if (cell.col + cell.row) % 2 == 0 { DARK_TILE } else { LIGHT_TILE };
        let x = self.origin.0 + cell.col as TermInt * CELL_WIDTH;
        let y = self.origin.1 + cell.row as TermInt;
        for (i, ch) in glyph.chars().take(CELL_WIDTH as usize).enumerate() {
            self.term.print_colored((x + i as TermInt, y), ch, fg, bg);
        }
    }
}

/// Two-column drawing of one segment.
fn shape_glyph(shape: SegmentShape) -> &'static str {
    match shape {
        Head(dir) => head_glyph(dir),
        Tail(dir) if dir.is_vertical() => "│ ",
        Tail(_) => "──",
        Vertical => "║ ",
        Horizontal => "══",
        TopLeft => "╝ ",
        TopRight => "╚═",
        BottomLeft => "╗ ",
        BottomRight => "╔═",
    }
}

fn head_glyph(dir: Direction) -> &'static str {
    match dir {
        Up => "^ ",
        Down => "v ",
        Left => "<═",
        Right => "═>",
    }
}

/// Terminal cells are the unit here; the whole area is used.
fn terminal_layout() -> Layout {
    Layout { fill: 1.0, cell_size: 1, ..Layout::default() }
}

fn fit(layout: &Layout, w: TermInt, h: TermInt) -> Result<Grid> {
    // Borders take one column or row on each side
    let cols = (w.saturating_sub(2) / CELL_WIDTH) as i32;
    let rows = h.saturating_sub(2 + HUD_ROWS) as i32;
    layout.fit(cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_are_two_columns() {
        let shapes = [
            Head(Up), Head(Down), Head(Left), Head(Right),
            Tail(Up), Tail(Left), Vertical, Horizontal,
            TopLeft, TopRight, BottomLeft, BottomRight,
        ];
        for shape in shapes {
            assert_eq!(shape_glyph(shape).chars().count(), 2, "{:?}", shape);
        }
    }

    #[test]
    fn playfield_fits_inside_borders() {
        let grid = fit(&terminal_layout(), 120, 40).unwrap();
        assert!(grid.cols() as TermInt * CELL_WIDTH + 2 <= 120);
        assert!(grid.rows() as TermInt + 2 + HUD_ROWS <= 40);
        // 59 x 37 available, height follows the 1.75 aspect
        assert_eq!((grid.cols(), grid.rows()), (59, 33));
    }
}
