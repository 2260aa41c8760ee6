use thiserror::Error;

use crate::core::atomtypes::library::AtomTypeLoadError;
use crate::core::models::ids::AtomId;

/// An atom lacks the reference data an operation needs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("No atom type found for element '{symbol}'")]
    NoAtomType { symbol: String },

    #[error("Atom '{symbol}' has neither an implicit hydrogen count nor a valency")]
    MissingValency { symbol: String },

    #[error(
        "Atom '{symbol}' has neither an implicit hydrogen count nor a formal neighbour count"
    )]
    MissingFormalNeighbourCount { symbol: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("No atom could be saturated under any of the {attempts} sweep start positions")]
    Unsatisfiable { attempts: usize },

    #[error("Backtracking over {bonds} bonds exceeds the configured limit of {limit}")]
    SearchLimitExceeded { bonds: usize, limit: usize },

    #[error("Atom {0:?} not found in graph")]
    AtomNotFound(AtomId),

    #[error("Failed to load atom types: {source}")]
    AtomTypes {
        #[from]
        source: AtomTypeLoadError,
    },
}
