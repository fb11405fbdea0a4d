pub mod deployment;
pub mod dto;

pub use deployment::{
    cancel_deployment_handler, deploy_token_handler, get_deployment_status_handler,
    get_recent_tokens_handler, resume_deployment_handler,
};
pub use dto::*;
