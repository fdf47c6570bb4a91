use std::fs::File;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, WriteLogger};

use snake::config::Cli;
use snake::game::SnakeGame;
use snake::score::FileStore;
use snake::session::Session;
use snake::term::TermManager;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Stdout belongs to the game, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("creating log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
        .context("installing logger")?;

    info!("Starting with {:?}", cli.rules());

    let mut term = TermManager::new().context("reading terminal size")?;
    term.setup().context("preparing terminal")?;

    let result = run(&cli, term);

    // The main game loop returns on quit or error; either way hand the terminal back
    TermManager::restore().context("restoring terminal")?;
    if let Err(e) = &result {
        error!("Exiting on error: {:#}", e);
    }
    result
}

fn run(cli: &Cli, term: TermManager) -> anyhow::Result<()> {
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = FileStore::new(&cli.high_score_file);
    info!("High score kept in {}", store.path().display());
    let rules = cli.rules();

    let make_session = |grid| Session::new(grid, rules, rng, store);
    let mut game = SnakeGame::new(term, make_session, cli.frame_interval())
        .context("starting the game")?;

    if game.show_intro()? {
        game.play()?;
    }

    Ok(())
}
