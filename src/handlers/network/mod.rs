pub mod dto;
pub mod network;
pub mod service;

pub use dto::*;
pub use network::get_network_status_handler;
