pub mod pager;
pub mod proposal;

pub use pager::{ProposalPager, DEFAULT_PAGE_SIZE};
pub use proposal::{ProposalRecord, TallyPercentages, VoteTally};
