//! # Re-optimization pass
//!
//! Runs after every pool mutation, in two phases:
//!
//! 1. **Search.** Each campaign, in insertion order, asks the strategy for its
//!    best subset. In [`AllocationMode::Shared`] every campaign sees the whole
//!    pool; in [`AllocationMode::Exclusive`] funders claimed earlier in the
//!    pass are withheld from later campaigns.
//! 2. **Reconcile.** Each funder, in pool order, is owned by the *last*
//!    campaign whose new allocation contains it. When that owner differs from
//!    the funder's recorded campaign, the funder is reassigned and its
//!    assignment clock restarts. A move away from a concrete campaign is
//!    appended to the history log; a first assignment is not.
//!
//! Only the net move per funder is recorded, so a second pass over an
//! unchanged pool records nothing. Funders that no campaign selected keep
//! their recorded assignment.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::campaign::Campaign;
use crate::clock::Clock;
use crate::history::HistoryLog;
use crate::pool::FunderPool;
use crate::search::AllocationStrategy;
use crate::types::{AllocationMode, Funder, FunderId};

/// What a single pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub campaigns: usize,
    pub funders: usize,
    /// Campaigns left with no covering subset.
    pub unsatisfiable: usize,
    /// Funders assigned for the first time.
    pub assigned: usize,
    /// Funders moved between campaigns; one history entry each.
    pub reassigned: usize,
}

/// Borrowed view of everything a pass reads and writes.
pub(crate) struct Pass<'a> {
    pub campaigns: &'a mut [Campaign],
    pub pool: &'a mut FunderPool,
    pub history: &'a mut HistoryLog,
    pub strategy: &'a dyn AllocationStrategy,
    pub clock: &'a dyn Clock,
    pub mode: AllocationMode,
}

impl Pass<'_> {
    pub(crate) fn run(self) -> PassSummary {
        let mut summary = PassSummary {
            campaigns: self.campaigns.len(),
            funders: self.pool.len(),
            ..PassSummary::default()
        };

        summary.unsatisfiable = search_all(self.campaigns, self.pool, self.strategy, self.mode);

        for funder in self.pool.iter_mut() {
            let Some(owner) = self
                .campaigns
                .iter()
                .rev()
                .find(|c| c.contains(funder.id))
                .map(Campaign::id)
            else {
                continue;
            };

            if funder.assigned_campaign == Some(owner) {
                continue;
            }

            let now = self.clock.now();
            match funder.assigned_campaign {
                Some(previous) => {
                    let entry = self.history.record(funder, previous, owner, now);
                    info!(
                        funder_id = %entry.funder_id,
                        amount = %entry.amount,
                        from = %entry.from_campaign_id,
                        to = %entry.to_campaign_id,
                        held_secs = entry.duration.num_seconds(),
                        "Funder reassigned"
                    );
                    summary.reassigned += 1;
                }
                None => {
                    debug!(funder_id = %funder.id, campaign_id = %owner, "Funder assigned");
                    summary.assigned += 1;
                }
            }

            funder.assigned_campaign = Some(owner);
            funder.assignment_start_time = now;
        }

        info!(
            campaigns = summary.campaigns,
            funders = summary.funders,
            unsatisfiable = summary.unsatisfiable,
            assigned = summary.assigned,
            reassigned = summary.reassigned,
            "Re-optimization pass complete"
        );
        summary
    }
}

/// Phase 1. Returns the number of campaigns left unsatisfied.
fn search_all(
    campaigns: &mut [Campaign],
    pool: &FunderPool,
    strategy: &dyn AllocationStrategy,
    mode: AllocationMode,
) -> usize {
    let mut claimed: HashSet<FunderId> = HashSet::new();
    let mut unsatisfiable = 0;

    for campaign in campaigns.iter_mut() {
        let candidates: Vec<&Funder> = pool
            .as_slice()
            .iter()
            .filter(|f| mode == AllocationMode::Shared || !claimed.contains(&f.id))
            .collect();

        let campaign_id = campaign.id();
        let combination = campaign.optimize(strategy, &candidates);
        debug!(
            campaign_id = %campaign_id,
            candidates = candidates.len(),
            subset_size = combination.funders.len(),
            excess = %combination.excess,
            "Campaign searched"
        );

        if combination.excess.is_unbounded() {
            unsatisfiable += 1;
        }
        if mode == AllocationMode::Exclusive {
            claimed.extend(combination.funders.iter().copied());
        }
    }

    unsatisfiable
}
