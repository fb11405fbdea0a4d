pub mod dto;
pub mod governance;
pub mod service;

pub use dto::*;
pub use governance::get_proposals_handler;
