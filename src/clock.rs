use std::time::Duration;

use log::info;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Paused,
    GameOver,
}

/// Fixed-step timer. Real time goes in through `advance`, at most one
/// simulation step comes out per call.
#[derive(Debug)]
pub struct GameClock {
    accumulated: Duration,
    step: Duration,
    phase: Phase,
}

impl GameClock {
    pub fn new(step: Duration) -> Self {
        GameClock { accumulated: Duration::ZERO, step, phase: Phase::Running }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn set_step(&mut self, step: Duration) {
        self.step = step;
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Feeds `elapsed` real time. Returns true when one step is due.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.accumulated += elapsed;
        if self.accumulated < self.step {
            return false;
        }

        self.accumulated -= self.step;
        // No catch-up: anything beyond one more step is lost
        if self.accumulated >= self.step {
            self.accumulated = Duration::ZERO;
        }

        true
    }

    /// Running <-> Paused. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            Phase::GameOver => Phase::GameOver,
        };
        info!("Clock now {:?}", self.phase);
        self.phase
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            info!("Clock resumed");
        }
    }

    pub fn end(&mut self) {
        self.phase = Phase::GameOver;
        self.accumulated = Duration::ZERO;
    }
}
