use crate::invariants::{
    assert_all_solver_invariants, assert_allocations_disjoint, assert_minimal_against_pool,
};
use crate::{
    AllocationMode, AllocationStrategy, CampaignId, Combination, Excess, FundSolver, Funder,
    FunderId, FunderLookup, SolverConfig, SolverError,
};

/// Takes funders in pool order until the target is covered.
#[derive(Debug)]
struct FirstFit;

impl AllocationStrategy for FirstFit {
    fn find_best_combination(&self, target: i128, funders: &[&Funder]) -> Combination {
        let mut picked = Combination::unsatisfiable();
        for funder in funders {
            picked.funders.push(funder.id);
            picked.amounts.push(funder.amount);
            if picked.total() >= target {
                picked.excess = Excess::Amount(picked.total() - target);
                return picked;
            }
        }
        Combination::unsatisfiable()
    }
}

fn setup(mode: AllocationMode) -> FundSolver {
    let mut solver = FundSolver::new(SolverConfig {
        mode,
        ..SolverConfig::default()
    });
    solver.add_campaign(CampaignId(1), 800, 5.0).unwrap();
    solver.add_campaign(CampaignId(2), 1200, 7.5).unwrap();
    solver.add_campaign(CampaignId(3), 1000, 15.0).unwrap();
    solver
}

fn setup_with_funders(mode: AllocationMode) -> FundSolver {
    let mut solver = setup(mode);
    for amount in [100, 200, 300, 400, 500, 300] {
        solver.add_funder(amount).unwrap();
    }
    solver
}

fn pool_amounts(solver: &FundSolver) -> Vec<i128> {
    solver.funders().iter().map(|f| f.amount).collect()
}

fn allocated_amounts(solver: &FundSolver) -> Vec<Vec<i128>> {
    solver
        .get_campaign_allocations()
        .into_iter()
        .map(|a| a.allocated_amounts)
        .collect()
}

#[test]
fn test_full_pool_allocations_are_exact() {
    let solver = setup_with_funders(AllocationMode::Shared);

    assert_eq!(
        allocated_amounts(&solver),
        vec![vec![300, 500], vec![300, 400, 500], vec![100, 400, 500]]
    );
    for allocation in solver.get_campaign_allocations() {
        assert_eq!(allocation.excess_capital, Excess::Amount(0));
    }
    assert_minimal_against_pool(&solver.get_campaign_allocations(), &pool_amounts(&solver));
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_allocation_snapshot_carries_campaign_metadata() {
    let solver = setup_with_funders(AllocationMode::Shared);
    let allocations = solver.get_campaign_allocations();

    assert_eq!(allocations.len(), 3);
    assert_eq!(allocations[1].campaign_id, CampaignId(2));
    assert_eq!(allocations[1].target_amount, 1200);
    assert_eq!(allocations[1].interest_rate, 7.5);
    assert_eq!(
        allocations[0].allocated_funders,
        vec![FunderId(2), FunderId(4)]
    );
}

#[test]
fn test_shared_mode_records_last_claimant() {
    let solver = setup_with_funders(AllocationMode::Shared);

    // 500 is claimed by all three campaigns; campaign 3 is visited last.
    let funder = &solver.funders()[4];
    assert_eq!(funder.amount, 500);
    assert_eq!(funder.assigned_campaign, Some(CampaignId(3)));

    // The second 300 is not selected by anyone and was never assigned.
    assert_eq!(solver.funders()[5].assigned_campaign, None);
}

#[test]
fn test_remove_duplicate_amount_removes_exactly_one() {
    let mut solver = setup_with_funders(AllocationMode::Shared);

    let removed = solver.remove_funder(300).unwrap();
    assert_eq!(removed.id, FunderId(2));

    let amounts = pool_amounts(&solver);
    assert_eq!(amounts, vec![100, 200, 400, 500, 300]);
    assert_eq!(amounts.iter().filter(|a| **a == 300).count(), 1);

    assert_eq!(
        allocated_amounts(&solver),
        vec![vec![500, 300], vec![400, 500, 300], vec![100, 400, 500]]
    );
    assert_minimal_against_pool(&solver.get_campaign_allocations(), &amounts);
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_remove_missing_amount_changes_nothing() {
    let mut solver = setup_with_funders(AllocationMode::Shared);
    let allocations_before = solver.get_campaign_allocations();
    let history_before = solver.get_allocation_history().to_vec();

    let err = solver.remove_funder(999).unwrap_err();

    assert_eq!(err, SolverError::FunderNotFound(FunderLookup::Amount(999)));
    assert_eq!(solver.funders().len(), 6);
    assert_eq!(solver.get_campaign_allocations(), allocations_before);
    assert_eq!(solver.get_allocation_history(), history_before.as_slice());
}

#[test]
fn test_remove_by_id_targets_one_of_equal_amounts() {
    let mut solver = setup_with_funders(AllocationMode::Shared);

    let removed = solver.remove_funder_by_id(FunderId(5)).unwrap();
    assert_eq!(removed.amount, 300);
    assert!(solver.funders().iter().any(|f| f.id == FunderId(2)));

    assert_eq!(
        solver.remove_funder_by_id(FunderId(5)).unwrap_err(),
        SolverError::FunderNotFound(FunderLookup::Id(FunderId(5)))
    );
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_reoptimize_is_idempotent() {
    let mut solver = setup_with_funders(AllocationMode::Shared);
    let allocations = solver.get_campaign_allocations();
    let history_len = solver.get_allocation_history().len();

    let first = solver.reoptimize_all();
    let second = solver.reoptimize_all();

    assert_eq!(first.reassigned + first.assigned, 0);
    assert_eq!(second.reassigned + second.assigned, 0);
    assert_eq!(solver.get_allocation_history().len(), history_len);
    assert_eq!(solver.get_campaign_allocations(), allocations);
}

#[test]
fn test_unsatisfiable_campaign_reports_unbounded() {
    let mut solver = setup(AllocationMode::Shared);
    solver.add_funder(100).unwrap();
    solver.add_funder(200).unwrap();

    let summary = solver.reoptimize_all();
    assert_eq!(summary.unsatisfiable, 3);
    for allocation in solver.get_campaign_allocations() {
        assert!(allocation.allocated_amounts.is_empty());
        assert_eq!(allocation.excess_capital, Excess::Unbounded);
    }
    assert!(solver.funders().iter().all(|f| f.assigned_campaign.is_none()));
}

#[test]
fn test_campaign_waits_for_next_pass() {
    let mut solver = FundSolver::new(SolverConfig::default());
    solver.add_funder(500).unwrap();
    solver.add_campaign(CampaignId(9), 500, 1.0).unwrap();

    assert_eq!(
        solver.get_campaign_allocations()[0].excess_capital,
        Excess::Unbounded
    );

    solver.reoptimize_all();
    assert_eq!(
        solver.get_campaign_allocations()[0].excess_capital,
        Excess::Amount(0)
    );
    assert_eq!(solver.funders()[0].assigned_campaign, Some(CampaignId(9)));
}

#[test]
fn test_exclusive_mode_never_shares_a_funder() {
    let solver = setup_with_funders(AllocationMode::Exclusive);
    let allocations = solver.get_campaign_allocations();

    assert_allocations_disjoint(&allocations);
    assert_eq!(allocations[0].allocated_amounts, vec![300, 500]);
    assert_eq!(allocations[1].excess_capital, Excess::Unbounded);
    assert_eq!(allocations[2].allocated_amounts, vec![100, 200, 400, 300]);
    assert_eq!(allocations[2].excess_capital, Excess::Amount(0));
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_exclusive_mode_stays_disjoint_after_removal() {
    let mut solver = setup_with_funders(AllocationMode::Exclusive);
    solver.remove_funder(500).unwrap();

    assert_allocations_disjoint(&solver.get_campaign_allocations());
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let mut solver = setup(AllocationMode::Shared);

    assert_eq!(solver.add_funder(0), Err(SolverError::InvalidAmount(0)));
    assert_eq!(solver.add_funder(-50), Err(SolverError::InvalidAmount(-50)));
    assert_eq!(
        solver.add_campaign(CampaignId(4), 0, 1.0),
        Err(SolverError::InvalidTarget(0))
    );
    assert_eq!(
        solver.add_campaign(CampaignId(1), 500, 1.0),
        Err(SolverError::DuplicateCampaign(CampaignId(1)))
    );
    assert!(matches!(
        solver.add_campaign(CampaignId(4), 500, f64::NAN),
        Err(SolverError::InvalidInterestRate(_))
    ));

    assert!(solver.funders().is_empty());
    assert_eq!(solver.campaigns().len(), 3);
}

#[test]
fn test_pool_ceiling_is_enforced() {
    let mut solver = FundSolver::new(SolverConfig {
        max_pool_size: 3,
        ..SolverConfig::default()
    });
    for amount in [10, 20, 30] {
        solver.add_funder(amount).unwrap();
    }

    assert_eq!(solver.config().max_pool_size, 3);
    assert_eq!(
        solver.add_funder(40),
        Err(SolverError::PoolFull { limit: 3 })
    );
    solver.remove_funder(10).unwrap();
    assert_eq!(solver.add_funder(40), Ok(FunderId(3)));
}

#[test]
fn test_strategy_can_be_swapped() {
    let mut solver = FundSolver::new(SolverConfig::default()).with_strategy(FirstFit);
    solver.add_campaign(CampaignId(1), 800, 5.0).unwrap();
    for amount in [100, 200, 300, 400, 500] {
        solver.add_funder(amount).unwrap();
    }

    let allocation = &solver.get_campaign_allocations()[0];
    assert_eq!(allocation.allocated_amounts, vec![100, 200, 300, 400]);
    assert_eq!(allocation.excess_capital, Excess::Amount(200));
    assert_all_solver_invariants(&solver);
}

#[test]
fn test_amount_that_would_overflow_pool_total_is_rejected() {
    let half = i128::MAX / 2 + 1;
    let mut solver = FundSolver::new(SolverConfig::default());
    solver.add_campaign(CampaignId(1), i128::MAX, 1.0).unwrap();

    assert_eq!(solver.add_funder(half), Ok(FunderId(0)));
    assert_eq!(
        solver.add_funder(half),
        Err(SolverError::AmountOverflow(half))
    );
    assert_eq!(solver.funders().len(), 1);
    assert_eq!(solver.pool_total(), half);

    // Amounts that still fit are admitted and searched normally.
    assert_eq!(solver.add_funder(i128::MAX - half), Ok(FunderId(1)));
    assert_eq!(solver.pool_total(), i128::MAX);
    let allocation = &solver.get_campaign_allocations()[0];
    assert_eq!(
        allocation.allocated_funders,
        vec![FunderId(0), FunderId(1)]
    );
    assert_eq!(allocation.excess_capital, Excess::Amount(0));

    assert_eq!(solver.add_funder(1), Err(SolverError::AmountOverflow(1)));
    assert_all_solver_invariants(&solver);
}
