use anyhow::{bail, Result};

use crate::{
    chain::ChainReader,
    governance::ProposalPager,
    handlers::governance::dto::{ProposalResponse, ProposalsPageResponse, MAX_PAGE_SIZE},
};

/// Service layer for governance reads
pub struct GovernanceService;

impl GovernanceService {
    /// Fetch one page. Each request walks with its own pager so the end of the
    /// list is always read from the chain.
    pub async fn get_proposals(
        chain: &dyn ChainReader,
        page: u64,
        page_size: u64,
    ) -> Result<ProposalsPageResponse> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            bail!("page_size must be between 1 and {}", MAX_PAGE_SIZE);
        }
        if page == 0 {
            bail!("page must be 1 or greater");
        }

        let mut pager = ProposalPager::new(page_size)?;
        let proposals = pager.fetch_page(chain, page).await?;

        Ok(ProposalsPageResponse {
            page,
            page_size,
            last_page: pager.last_page(),
            has_more: pager.last_page().map_or(true, |last| page < last),
            proposals: proposals.into_iter().map(ProposalResponse::from).collect(),
        })
    }
}
