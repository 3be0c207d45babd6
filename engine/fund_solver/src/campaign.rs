//! Campaign: a funding target that owns its current allocation.

use crate::search::{AllocationStrategy, Combination};
use crate::types::{CampaignAllocation, CampaignId, Excess, Funder, FunderId};

#[derive(Clone, Debug, PartialEq)]
pub struct Campaign {
    id: CampaignId,
    target_amount: i128,
    /// Descriptive only; the search ignores it.
    interest_rate: f64,
    allocation: Combination,
}

impl Campaign {
    /// Callers validate `target_amount` and `interest_rate` first.
    pub(crate) fn new(id: CampaignId, target_amount: i128, interest_rate: f64) -> Self {
        Campaign {
            id,
            target_amount,
            interest_rate,
            allocation: Combination::unsatisfiable(),
        }
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn target_amount(&self) -> i128 {
        self.target_amount
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn excess_capital(&self) -> Excess {
        self.allocation.excess
    }

    pub fn current_allocation(&self) -> &[FunderId] {
        &self.allocation.funders
    }

    pub fn contains(&self, id: FunderId) -> bool {
        self.allocation.contains(id)
    }

    /// Replace the current allocation with the strategy's pick for this target.
    pub fn optimize(
        &mut self,
        strategy: &dyn AllocationStrategy,
        funders: &[&Funder],
    ) -> &Combination {
        self.allocation = strategy.find_best_combination(self.target_amount, funders);
        &self.allocation
    }

    pub fn allocation(&self) -> CampaignAllocation {
        CampaignAllocation {
            campaign_id: self.id,
            target_amount: self.target_amount,
            interest_rate: self.interest_rate,
            allocated_amounts: self.allocation.amounts.clone(),
            allocated_funders: self.allocation.funders.clone(),
            excess_capital: self.allocation.excess,
        }
    }
}
