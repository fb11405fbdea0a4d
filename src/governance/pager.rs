use anyhow::{bail, Result};
use log::debug;

use super::proposal::ProposalRecord;
use crate::chain::ChainReader;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Walks the governance precompile one page at a time.
///
/// Pages are one-based. The first page shorter than `page_size` marks the end,
/// and later requests past it are answered locally.
#[derive(Debug, Clone)]
pub struct ProposalPager {
    page_size: u64,
    current_page: u64,
    last_page: Option<u64>,
}

impl Default for ProposalPager {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            last_page: None,
        }
    }
}

impl ProposalPager {
    pub fn new(page_size: u64) -> Result<Self> {
        if page_size == 0 {
            bail!("Page size must be greater than zero");
        }
        Ok(Self {
            page_size,
            ..Default::default()
        })
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn last_page(&self) -> Option<u64> {
        self.last_page
    }

    pub fn has_more(&self) -> bool {
        self.last_page
            .map_or(true, |last| self.current_page < last)
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
        self.last_page = None;
    }

    pub async fn fetch_page(
        &mut self,
        chain: &dyn ChainReader,
        page: u64,
    ) -> Result<Vec<ProposalRecord>> {
        if page == 0 {
            bail!("Pages start at 1");
        }
        if let Some(last) = self.last_page {
            if page > last {
                debug!("Page {} is past the last page {}", page, last);
                return Ok(vec![]);
            }
        }

        let proposals = chain.proposals(page, self.page_size).await?;
        let count = proposals.len() as u64;

        if count < self.page_size {
            // an empty page means the previous one was the end
            let last = if count == 0 { page.saturating_sub(1).max(1) } else { page };
            self.last_page = Some(self.last_page.map_or(last, |known| known.min(last)));
        }
        self.current_page = match self.last_page {
            Some(last) => page.min(last),
            None => page,
        };

        Ok(proposals)
    }

    /// Fetch the page after the current one, empty once the end is known
    pub async fn next_page(&mut self, chain: &dyn ChainReader) -> Result<Vec<ProposalRecord>> {
        let next = self.current_page.saturating_add(1);
        self.fetch_page(chain, next).await
    }
}
