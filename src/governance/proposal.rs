use alloy::primitives::{Address, U256};
use log::warn;
use serde::Serialize;

use crate::chain::contracts::IGovernance;

const BASIS_POINTS: u64 = 10_000;

/// Vote totals for one proposal, in the chain's smallest unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub yes: U256,
    pub abstain: U256,
    pub no: U256,
    pub no_with_veto: U256,
}

/// Share of each option in basis points (1/100 of a percent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TallyPercentages {
    pub yes: u64,
    pub abstain: u64,
    pub no: u64,
    pub no_with_veto: u64,
}

impl TallyPercentages {
    /// Render basis points as a percentage string with two decimals
    pub fn format(basis_points: u64) -> String {
        format!("{}.{:02}", basis_points / 100, basis_points % 100)
    }
}

impl VoteTally {
    pub fn total(&self) -> U256 {
        self.yes
            .saturating_add(self.abstain)
            .saturating_add(self.no)
            .saturating_add(self.no_with_veto)
    }

    pub fn percentages(&self) -> TallyPercentages {
        let total = self.total();
        if total.is_zero() {
            return TallyPercentages::default();
        }
        TallyPercentages {
            yes: basis_points(self.yes, total),
            abstain: basis_points(self.abstain, total),
            no: basis_points(self.no, total),
            no_with_veto: basis_points(self.no_with_veto, total),
        }
    }
}

fn basis_points(part: U256, total: U256) -> u64 {
    let scale = U256::from(BASIS_POINTS);
    let bps = match part.checked_mul(scale) {
        Some(scaled) => scaled / total,
        // part * 10^4 overflowed, so total is large enough to divide first
        None => part / (total / scale).max(U256::from(1)),
    };
    bps.min(scale).to::<u64>()
}

fn parse_tally_amount(field: &str, value: &str) -> U256 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return U256::ZERO;
    }
    U256::from_str_radix(trimmed, 10).unwrap_or_else(|e| {
        warn!("Unreadable {} tally '{}': {}", field, value, e);
        U256::ZERO
    })
}

/// A governance proposal as returned by the governance precompile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRecord {
    pub id: u64,
    pub proposer: Address,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub submit_time: u64,
    pub voting_start_time: u64,
    pub voting_end_time: u64,
    pub tally: VoteTally,
}

impl From<IGovernance::ProposalData> for ProposalRecord {
    fn from(data: IGovernance::ProposalData) -> Self {
        let tally = &data.currentTallyResult;
        Self {
            id: data.id,
            proposer: data.proposer,
            title: data.title.clone(),
            summary: data.summary.clone(),
            status: data.status.clone(),
            submit_time: data.submitTime,
            voting_start_time: data.votingStartTime,
            voting_end_time: data.votingEndTime,
            tally: VoteTally {
                yes: parse_tally_amount("yes", &tally.yes),
                abstain: parse_tally_amount("abstain", &tally.abstain),
                no: parse_tally_amount("no", &tally.no),
                no_with_veto: parse_tally_amount("no_with_veto", &tally.no_with_veto),
            },
        }
    }
}
