pub mod chain;
pub mod config;
pub mod database;
pub mod deployment;
pub mod errors;
pub mod governance;
pub mod handlers;
pub mod routes;
pub mod services;
