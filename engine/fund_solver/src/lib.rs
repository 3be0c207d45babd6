//! # Fund Solver
//!
//! Assigns a changing pool of funders to a fixed list of campaigns so that
//! each campaign's target is met with the least excess capital, and records
//! how funders move between campaigns as the pool changes.
//!
//! | Phase        | Entry Point(s)                                         |
//! |--------------|--------------------------------------------------------|
//! | Bootstrap    | [`FundSolver::new`], [`FundSolver::with_clock`]        |
//! | Campaigns    | [`FundSolver::add_campaign`]                           |
//! | Pool         | [`FundSolver::add_funder`], [`FundSolver::remove_funder`], [`FundSolver::remove_funder_by_id`] |
//! | Optimization | [`FundSolver::reoptimize_all`]                         |
//! | Queries      | `get_campaign_allocations`, `get_allocation_history`, `funders`, `pool_total` |
//!
//! ## Architecture
//!
//! Subset selection is delegated to an [`AllocationStrategy`] (by default the
//! exhaustive [`ExhaustiveSearch`]). Pool bookkeeping lives in `pool`, the
//! pass and its reconciliation in [`orchestrator`], and the reassignment log
//! in `history`. This file contains only the public entry points and input
//! validation.
//!
//! Every pool mutation runs a full pass before returning. A solver is plain
//! owned state; hosts that share one across threads must hold a single lock
//! around each "mutate, then re-optimize" call.

pub mod campaign;
pub mod clock;
pub mod errors;
mod history;
pub mod orchestrator;
mod pool;
pub mod search;
pub mod types;

#[cfg(test)]
mod test_scenarios;

use tracing::{debug, info, warn};

use campaign::Campaign;
use history::HistoryLog;
use orchestrator::Pass;
use pool::FunderPool;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{FunderLookup, Result, SolverError};
pub use orchestrator::PassSummary;
pub use search::{find_best_combination, AllocationStrategy, Combination, ExhaustiveSearch};
pub use types::{
    AllocationMode, CampaignAllocation, CampaignId, Excess, Funder, FunderId, ReassignmentEntry,
    SolverConfig, DEFAULT_MAX_POOL_SIZE,
};

#[derive(Debug)]
pub struct FundSolver {
    config: SolverConfig,
    campaigns: Vec<Campaign>,
    pool: FunderPool,
    history: HistoryLog,
    strategy: Box<dyn AllocationStrategy>,
    clock: Box<dyn Clock>,
}

impl FundSolver {
    // ─────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────

    /// A solver on wall-clock time using the exhaustive search.
    pub fn new(config: SolverConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: SolverConfig, clock: impl Clock + 'static) -> Self {
        FundSolver {
            config,
            campaigns: Vec::new(),
            pool: FunderPool::new(),
            history: HistoryLog::new(),
            strategy: Box::new(ExhaustiveSearch),
            clock: Box::new(clock),
        }
    }

    /// Swap the subset-selection algorithm.
    pub fn with_strategy(mut self, strategy: impl AllocationStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────
    // Campaigns
    // ─────────────────────────────────────────────────────────

    /// Register a campaign at the end of the processing order.
    ///
    /// Does not run a pass; the campaign is first optimized on the next pool
    /// mutation or explicit [`reoptimize_all`](Self::reoptimize_all).
    pub fn add_campaign(
        &mut self,
        id: CampaignId,
        target_amount: i128,
        interest_rate: f64,
    ) -> Result<()> {
        if target_amount <= 0 {
            return Err(SolverError::InvalidTarget(target_amount));
        }
        if !interest_rate.is_finite() {
            return Err(SolverError::InvalidInterestRate(interest_rate));
        }
        if self.campaigns.iter().any(|c| c.id() == id) {
            return Err(SolverError::DuplicateCampaign(id));
        }

        self.campaigns.push(Campaign::new(id, target_amount, interest_rate));
        info!(campaign_id = %id, target_amount = %target_amount, interest_rate, "Campaign added");
        Ok(())
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    // ─────────────────────────────────────────────────────────
    // Funder pool
    // ─────────────────────────────────────────────────────────

    /// Add a funder and re-optimize every campaign.
    pub fn add_funder(&mut self, amount: i128) -> Result<FunderId> {
        if amount <= 0 {
            return Err(SolverError::InvalidAmount(amount));
        }
        if self.pool.len() >= self.config.max_pool_size {
            return Err(SolverError::PoolFull {
                limit: self.config.max_pool_size,
            });
        }
        // Every subset total the search forms is bounded by the pool total.
        if self.pool_total().checked_add(amount).is_none() {
            return Err(SolverError::AmountOverflow(amount));
        }

        let id = self.pool.insert(amount, self.clock.now());
        debug!(funder_id = %id, amount = %amount, "Funder added");
        self.reoptimize_all();
        Ok(id)
    }

    /// Remove the first funder, in pool order, contributing `amount`, then
    /// re-optimize. Funders sharing an amount are not otherwise distinguished;
    /// use [`remove_funder_by_id`](Self::remove_funder_by_id) to target one.
    pub fn remove_funder(&mut self, amount: i128) -> Result<Funder> {
        match self.pool.remove_first_by_amount(amount) {
            Some(funder) => Ok(self.after_removal(funder)),
            None => Err(not_found(FunderLookup::Amount(amount))),
        }
    }

    pub fn remove_funder_by_id(&mut self, id: FunderId) -> Result<Funder> {
        match self.pool.remove_by_id(id) {
            Some(funder) => Ok(self.after_removal(funder)),
            None => Err(not_found(FunderLookup::Id(id))),
        }
    }

    fn after_removal(&mut self, funder: Funder) -> Funder {
        debug!(funder_id = %funder.id, amount = %funder.amount, "Funder removed");
        self.reoptimize_all();
        funder
    }

    pub fn funders(&self) -> &[Funder] {
        self.pool.as_slice()
    }

    /// Sum of every funder amount. Bounded by `i128::MAX` on admission.
    pub fn pool_total(&self) -> i128 {
        self.pool.as_slice().iter().map(|f| f.amount).sum()
    }

    // ─────────────────────────────────────────────────────────
    // Optimization
    // ─────────────────────────────────────────────────────────

    /// Recompute every campaign's allocation against the current pool and
    /// reconcile funder assignments. Never fails.
    pub fn reoptimize_all(&mut self) -> PassSummary {
        Pass {
            campaigns: &mut self.campaigns,
            pool: &mut self.pool,
            history: &mut self.history,
            strategy: self.strategy.as_ref(),
            clock: self.clock.as_ref(),
            mode: self.config.mode,
        }
        .run()
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_campaign_allocations(&self) -> Vec<CampaignAllocation> {
        self.campaigns.iter().map(Campaign::allocation).collect()
    }

    pub fn get_allocation_history(&self) -> &[ReassignmentEntry] {
        self.history.entries()
    }
}

fn not_found(lookup: FunderLookup) -> SolverError {
    warn!("Funder with {lookup} not found");
    SolverError::FunderNotFound(lookup)
}
