pub mod deployment;
pub mod governance;
pub mod network;
pub mod routes;

pub use routes::*;
