//! Application-wide error types.

use fund_solver::SolverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Solver lock poisoned")]
    LockPoisoned,

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AllocatorError>;
