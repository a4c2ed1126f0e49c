//! Error types for the inference engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A cycle in the predicate dependency graph traverses a negative edge.
    /// Lists the predicates lying on the negative cycle.
    #[error("rule set is not stratifiable: negation cycle through {}", preds.join(", "))]
    NotStratifiable { preds: Vec<String> },

    /// The per-stratum fixed point did not converge within the iteration cap
    #[error("fixed-point overrun in stratum {stratum}: {iterations} iterations without convergence")]
    FixedPointOverrun { stratum: usize, iterations: usize },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
