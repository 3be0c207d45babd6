//! Solver error types.

use std::fmt;

use thiserror::Error;

use crate::types::{CampaignId, FunderId};

/// How a caller tried to locate a funder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunderLookup {
    Amount(i128),
    Id(FunderId),
}

impl fmt::Display for FunderLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunderLookup::Amount(amount) => write!(f, "amount {amount}"),
            FunderLookup::Id(id) => write!(f, "id {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Funder not found: {0}")]
    FunderNotFound(FunderLookup),

    #[error("Invalid funder amount: {0} (must be positive)")]
    InvalidAmount(i128),

    #[error("Funder amount {0} would overflow the pool total")]
    AmountOverflow(i128),

    #[error("Invalid campaign target: {0} (must be positive)")]
    InvalidTarget(i128),

    #[error("Invalid interest rate: {0}")]
    InvalidInterestRate(f64),

    #[error("Campaign {0} already exists")]
    DuplicateCampaign(CampaignId),

    #[error("Funder pool is full ({limit} funders)")]
    PoolFull { limit: usize },
}

pub type Result<T> = std::result::Result<T, SolverError>;
