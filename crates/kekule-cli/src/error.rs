use kekule::core::io::toml_graph::GraphFileError;
use kekule::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error("Failed to process molecule file '{path}': {source}", path = path.display())]
    GraphFile {
        path: PathBuf,
        #[source]
        source: GraphFileError,
    },

    #[error("{count} of {total} atoms are not saturated")]
    Unsaturated { count: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
