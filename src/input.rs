use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::grid::Direction::{self, *};

/// Minimum swipe length in pixels.
pub const SWIPE_THRESHOLD: i32 = 30;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    TogglePause,
    Resume,
    Restart,
    /// Space: pause while playing, restart after game over.
    PauseOrRestart,
    Quit,
}

/// Direction changes waiting for the next tick.
#[derive(Debug, Default)]
pub struct InputBuffer {
    queue: VecDeque<Direction>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `direction` unless it repeats the last queued entry. Returns
    /// whether it was queued.
    pub fn enqueue(&mut self, direction: Direction) -> bool {
        if self.queue.back() == Some(&direction) {
            return false;
        }

        self.queue.push_back(direction);
        true
    }

    /// Oldest pending direction. Drained once per tick.
    pub fn dequeue_one(&mut self) -> Option<Direction> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Direction> {
        self.queue.iter()
    }
}

pub fn action_for_key(ev: &KeyEvent) -> Option<Action> {
    if ev.kind == KeyEventKind::Release {
        return None;
    }

    if is_ctrl_c(ev) {
        return Some(Action::Quit);
    }

    let action = match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Action::Turn(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Action::Turn(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Action::Turn(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Action::Turn(Right),
        KeyCode::Char(' ') => Action::PauseOrRestart,
        KeyCode::Char('p') | KeyCode::Esc => Action::TogglePause,
        KeyCode::Char('r') => Action::Resume,
        KeyCode::Enter => Action::Restart,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };

    Some(action)
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

/// Direction of a swipe covering `(dx, dy)`, judged on its dominant axis.
/// Swipes no longer than `threshold` are ignored.
pub fn swipe_direction(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx.abs() > threshold {
            return Some(if dx > 0 { Right } else { Left });
        }
    } else if dy.abs() > threshold {
        return Some(if dy > 0 { Down } else { Up });
    }

    None
}

/// Tracks a press-drag-release gesture.
#[derive(Debug)]
pub struct SwipeTracker {
    start: Option<(i32, i32)>,
    threshold: i32,
}

impl SwipeTracker {
    pub fn new(threshold: i32) -> Self {
        SwipeTracker { start: None, threshold }
    }

    pub fn begin(&mut self, x: i32, y: i32) {
        self.start = Some((x, y));
    }

    pub fn end(&mut self, x: i32, y: i32) -> Option<Direction> {
        let (sx, sy) = self.start.take()?;
        swipe_direction(x - sx, y - sy, self.threshold)
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}
