//! Append-only log of funder reassignments between campaigns.

use chrono::{DateTime, Utc};

use crate::types::{CampaignId, Funder, ReassignmentEntry};

#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<ReassignmentEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog::default()
    }

    pub fn entries(&self) -> &[ReassignmentEntry] {
        &self.entries
    }

    /// Record `funder` leaving `from` for `to` at `ended_at`. The assignment
    /// being closed started at the funder's `assignment_start_time`.
    pub(crate) fn record(
        &mut self,
        funder: &Funder,
        from: CampaignId,
        to: CampaignId,
        ended_at: DateTime<Utc>,
    ) -> &ReassignmentEntry {
        self.entries.push(ReassignmentEntry {
            funder_id: funder.id,
            amount: funder.amount,
            from_campaign_id: from,
            to_campaign_id: to,
            start_time: funder.assignment_start_time,
            end_time: ended_at,
            duration: ended_at - funder.assignment_start_time,
        });
        &self.entries[self.entries.len() - 1]
    }
}
