use serde::Serialize;

use crate::deployment::{DeployedToken, DeploymentStatus};

// Response for POST /tokens/deploy
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub tx_hash: String,
    pub status: DeploymentStatus,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentTokensResponse {
    pub tokens: Vec<DeployedToken>,
    pub count: usize,
}

impl RecentTokensResponse {
    pub fn new(tokens: Vec<DeployedToken>) -> Self {
        Self {
            count: tokens.len(),
            tokens,
        }
    }
}

/// Explorer link for a transaction, when an explorer is configured
pub fn explorer_tx_url(block_explorer: Option<&str>, tx_hash: &str) -> Option<String> {
    block_explorer.map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
}
