use serde::{Deserialize, Serialize};

use crate::database::models::utils::{address_to_string, u256_to_string};
use crate::governance::{ProposalRecord, TallyPercentages, DEFAULT_PAGE_SIZE};

pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ProposalsQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ProposalsQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct TallyResponse {
    pub yes: String,
    pub abstain: String,
    pub no: String,
    pub no_with_veto: String,
}

/// Percentages with two decimals, e.g. "33.33"
#[derive(Debug, Serialize)]
pub struct TallyPercentagesResponse {
    pub yes: String,
    pub abstain: String,
    pub no: String,
    pub no_with_veto: String,
}

impl From<TallyPercentages> for TallyPercentagesResponse {
    fn from(pct: TallyPercentages) -> Self {
        Self {
            yes: TallyPercentages::format(pct.yes),
            abstain: TallyPercentages::format(pct.abstain),
            no: TallyPercentages::format(pct.no),
            no_with_veto: TallyPercentages::format(pct.no_with_veto),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub id: u64,
    pub proposer: String,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub submit_time: u64,
    pub voting_start_time: u64,
    pub voting_end_time: u64,
    pub tally: TallyResponse,
    pub percentages: TallyPercentagesResponse,
}

impl From<ProposalRecord> for ProposalResponse {
    fn from(record: ProposalRecord) -> Self {
        let percentages = record.tally.percentages().into();
        Self {
            id: record.id,
            proposer: address_to_string(&record.proposer),
            title: record.title,
            summary: record.summary,
            status: record.status,
            submit_time: record.submit_time,
            voting_start_time: record.voting_start_time,
            voting_end_time: record.voting_end_time,
            tally: TallyResponse {
                yes: u256_to_string(&record.tally.yes),
                abstain: u256_to_string(&record.tally.abstain),
                no: u256_to_string(&record.tally.no),
                no_with_veto: u256_to_string(&record.tally.no_with_veto),
            },
            percentages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalsPageResponse {
    pub page: u64,
    pub page_size: u64,
    pub last_page: Option<u64>,
    pub has_more: bool,
    pub proposals: Vec<ProposalResponse>,
}
