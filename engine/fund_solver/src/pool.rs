//! # Funder pool
//!
//! Typed helpers over the in-memory funder list owned by a solver.
//!
//! | Field      | Type          | Description                                  |
//! |------------|---------------|----------------------------------------------|
//! | `funders`  | `Vec<Funder>` | Live funders in insertion order               |
//! | `next_id`  | `u64`         | Auto-increment funder id counter              |
//!
//! Insertion order is significant: it is the candidate order handed to the
//! search, and therefore decides tie-breaks. Removal preserves the relative
//! order of the remaining funders.

use chrono::{DateTime, Utc};

use crate::types::{Funder, FunderId};

#[derive(Debug, Default)]
pub struct FunderPool {
    funders: Vec<Funder>,
    next_id: u64,
}

impl FunderPool {
    pub fn new() -> Self {
        FunderPool::default()
    }

    pub fn len(&self) -> usize {
        self.funders.len()
    }

    pub fn as_slice(&self) -> &[Funder] {
        &self.funders
    }

    /// Reads, increments, and stores the funder counter.
    /// Returns the id to use for the *current* funder (pre-increment value).
    fn get_and_increment_funder_id(&mut self) -> FunderId {
        let current = self.next_id;
        self.next_id += 1;
        FunderId(current)
    }

    /// Append an unassigned funder that entered the pool at `entered_at`.
    pub fn insert(&mut self, amount: i128, entered_at: DateTime<Utc>) -> FunderId {
        let id = self.get_and_increment_funder_id();
        self.funders.push(Funder {
            id,
            amount,
            assigned_campaign: None,
            assignment_start_time: entered_at,
        });
        id
    }

    /// Remove the first funder, in pool order, contributing exactly `amount`.
    pub fn remove_first_by_amount(&mut self, amount: i128) -> Option<Funder> {
        let index = self.funders.iter().position(|f| f.amount == amount)?;
        Some(self.funders.remove(index))
    }

    pub fn remove_by_id(&mut self, id: FunderId) -> Option<Funder> {
        let index = self.funders.iter().position(|f| f.id == id)?;
        Some(self.funders.remove(index))
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Funder> {
        self.funders.iter_mut()
    }
}
