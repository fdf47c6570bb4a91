use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use simplelog::LevelFilter;

use crate::engine::Rules;

#[derive(Parser, Debug)]
#[command(name = "snake", version, about = "Wrap-around snake for the terminal")]
pub struct Cli {
    /// Seed for food placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where the best score is kept
    #[arg(long, default_value = ".snake_high_score.json")]
    pub high_score_file: PathBuf,

    #[arg(long, default_value = "snake.log")]
    pub log_file: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Milliseconds between moves at the start of a run
    #[arg(long, default_value_t = 100)]
    pub step_ms: u64,

    /// Fastest the snake will ever get
    #[arg(long, default_value_t = 40)]
    pub min_step_ms: u64,

    /// Milliseconds between render frames
    #[arg(long, default_value_t = 5)]
    pub frame_ms: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn rules(&self) -> Rules {
        Rules {
            initial_step: Duration::from_millis(self.step_ms),
            min_step: Duration::from_millis(self.min_step_ms),
            ..Rules::default()
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rules() {
        let cli = Cli::parse_from(["snake"]);
        assert_eq!(cli.rules(), Rules::default());
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.frame_interval(), Duration::from_millis(5));
    }

    #[test]
    fn overrides_apply() {
        let cli = Cli::parse_from([
            "snake",
            "--seed",
            "9",
            "--step-ms",
            "150",
            "--min-step-ms",
            "60",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.rules().initial_step, Duration::from_millis(150));
        assert_eq!(cli.rules().min_step, Duration::from_millis(60));
        assert_eq!(LevelFilter::from(cli.log_level), LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(Cli::try_parse_from(["snake", "--step-ms", "fast"]).is_err());
    }
}
