use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("could not access store at {path}: {source}")]
    StoreIo { path: PathBuf, source: io::Error },

    #[error("malformed store contents: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("{width}x{height} is not a positive multiple of cell size {cell_size}")]
    InvalidGrid { width: i32, height: i32, cell_size: i32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SnakeError>;
