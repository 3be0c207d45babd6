//! # Combinatorial allocation search
//!
//! Selects the subset of candidate funders whose total covers a target with
//! the smallest non-negative overshoot.
//!
//! ## Enumeration order
//!
//! Subsets are visited by increasing size; within one size, index tuples are
//! visited in lexicographic order over the candidate slice:
//!
//! ```text
//! size 1: (0) (1) (2) ...
//! size 2: (0,1) (0,2) ... (1,2) ...
//! ```
//!
//! A candidate replaces the current best only on a strict improvement, so
//! among equally good subsets the first one visited wins. An exact cover ends
//! the search immediately.
//!
//! ## Cost
//!
//! The search is exponential in the number of candidates. Callers bound the
//! pool with [`SolverConfig::max_pool_size`](crate::SolverConfig). A size
//! whose largest possible total still falls short of the target is skipped
//! without enumeration; this never changes which subset is returned.

use std::fmt;

use crate::types::{Excess, Funder, FunderId};

/// The winning subset for one target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Combination {
    /// Selected funders, in candidate order.
    pub funders: Vec<FunderId>,
    /// Amounts of the selected funders, parallel to `funders`.
    pub amounts: Vec<i128>,
    pub excess: Excess,
}

impl Combination {
    /// The result when nothing in the pool covers the target.
    pub fn unsatisfiable() -> Self {
        Combination::default()
    }

    /// Saturates at `i128::MAX`.
    pub fn total(&self) -> i128 {
        self.amounts.iter().fold(0, |acc, a| acc.saturating_add(*a))
    }

    pub fn contains(&self, id: FunderId) -> bool {
        self.funders.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.funders.is_empty()
    }
}

/// Subset selection behind the campaign and orchestrator contracts.
pub trait AllocationStrategy: fmt::Debug + Send + Sync {
    fn find_best_combination(&self, target: i128, funders: &[&Funder]) -> Combination;
}

/// Brute-force subset enumeration with first-found tie-breaking.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExhaustiveSearch;

impl AllocationStrategy for ExhaustiveSearch {
    fn find_best_combination(&self, target: i128, funders: &[&Funder]) -> Combination {
        let amounts: Vec<i128> = funders.iter().map(|f| f.amount).collect();
        let n = amounts.len();

        let mut descending = amounts.clone();
        descending.sort_unstable_by(|a, b| b.cmp(a));

        let mut best_excess = Excess::Unbounded;
        let mut best_indices: Vec<usize> = Vec::new();
        // Largest total any subset of the current size can reach.
        let mut reach: i128 = 0;

        'sizes: for size in 1..=n {
            reach = reach.saturating_add(descending[size - 1]);
            if reach < target {
                continue;
            }

            let mut indices: Vec<usize> = (0..size).collect();
            loop {
                // A total past i128::MAX cannot beat any representable excess.
                let total = indices
                    .iter()
                    .try_fold(0i128, |acc, &i| acc.checked_add(amounts[i]));
                let excess = total
                    .filter(|t| *t >= target)
                    .and_then(|t| t.checked_sub(target));
                if let Some(excess) = excess.map(Excess::Amount) {
                    if excess < best_excess {
                        best_excess = excess;
                        best_indices.clone_from(&indices);
                        if excess.is_exact() {
                            break 'sizes;
                        }
                    }
                }
                if !next_combination(&mut indices, n) {
                    break;
                }
            }
        }

        if best_excess.is_unbounded() {
            return Combination::unsatisfiable();
        }

        Combination {
            funders: best_indices.iter().map(|&i| funders[i].id).collect(),
            amounts: best_indices.iter().map(|&i| amounts[i]).collect(),
            excess: best_excess,
        }
    }
}

/// Run the default exhaustive search over an owned funder slice.
pub fn find_best_combination(target: i128, funders: &[Funder]) -> Combination {
    let candidates: Vec<&Funder> = funders.iter().collect();
    ExhaustiveSearch.find_best_combination(target, &candidates)
}

/// Advance `indices` to the next k-combination of `0..n` in lexicographic
/// order. Returns `false` once the last combination has been visited.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    for i in (0..k).rev() {
        if indices[i] != i + n - k {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
