pub mod auth;
pub mod deployment;
pub mod governance;
pub mod network;
