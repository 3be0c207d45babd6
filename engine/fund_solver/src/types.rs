//! # Types
//!
//! Shared data structures used across all modules of the fund solver.
//!
//! ## Design decisions
//!
//! ### Identity by handle
//!
//! Funders carry a generated [`FunderId`] so that two funders contributing
//! the same amount stay distinguishable for removal, history records, and
//! allocation-membership checks. Campaign ids are supplied by the caller.
//!
//! ### Excess as an ordered variant
//!
//! [`Excess`] replaces a floating-point infinity with an explicit variant.
//! `Unbounded` sorts after every concrete amount, so "smaller is better"
//! comparisons work without special cases:
//!
//! ```text
//! Amount(0) < Amount(1) < ... < Amount(n) < Unbounded
//! ```

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Default search ceiling: the exhaustive search is O(2^n) in pool size.
pub const DEFAULT_MAX_POOL_SIZE: usize = 20;

/// Unique funder handle, assigned from a per-solver counter starting at 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunderId(pub u64);

impl fmt::Display for FunderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied campaign identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub u64);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of contributed capital.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funder {
    /// Generated on entry to the pool.
    pub id: FunderId,
    /// Contributed amount in minor units. Immutable.
    pub amount: i128,
    /// Campaign this funder is recorded against; `None` until first assigned.
    pub assigned_campaign: Option<CampaignId>,
    /// Time of the most recent assignment, or of pool entry if never assigned.
    pub assignment_start_time: DateTime<Utc>,
}

/// Overshoot of an allocation above its campaign target.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Excess {
    /// Allocation covers the target; the payload is `total - target`.
    Amount(i128),
    /// No subset of the pool covers the target.
    #[default]
    Unbounded,
}

impl Excess {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Excess::Unbounded)
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Excess::Amount(0))
    }

    pub fn amount(&self) -> Option<i128> {
        match self {
            Excess::Amount(n) => Some(*n),
            Excess::Unbounded => None,
        }
    }
}

impl fmt::Display for Excess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Excess::Amount(n) => write!(f, "{n}"),
            Excess::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// How campaigns share the pool during a re-optimization pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Every campaign searches the full pool; the last claiming campaign
    /// becomes a funder's recorded owner.
    #[default]
    Shared,
    /// Funders claimed by an earlier campaign in the pass are withheld from
    /// later campaigns.
    Exclusive,
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMode::Shared => f.write_str("shared"),
            AllocationMode::Exclusive => f.write_str("exclusive"),
        }
    }
}

/// Solver tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Largest pool the exhaustive search is allowed to run against.
    pub max_pool_size: usize,
    pub mode: AllocationMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            mode: AllocationMode::Shared,
        }
    }
}

/// Read-only reporting view of a campaign and its current allocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignAllocation {
    pub campaign_id: CampaignId,
    pub target_amount: i128,
    pub interest_rate: f64,
    /// Amounts of the allocated funders, in pool order.
    pub allocated_amounts: Vec<i128>,
    pub allocated_funders: Vec<FunderId>,
    pub excess_capital: Excess,
}

/// Immutable record of a funder moving from one campaign to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReassignmentEntry {
    pub funder_id: FunderId,
    pub amount: i128,
    pub from_campaign_id: CampaignId,
    pub to_campaign_id: CampaignId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Always `end_time - start_time`; serialized as fractional seconds.
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: TimeDelta,
}

fn serialize_seconds<S: Serializer>(duration: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    let secs = duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9;
    s.serialize_f64(secs)
}
