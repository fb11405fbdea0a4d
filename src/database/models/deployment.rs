use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::deployment::state::{DeployedToken, DeploymentState, PendingDeployment};

/// Singleton deployment-state document
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeploymentStateDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<bson::oid::ObjectId>,
    #[serde(default)]
    pub recent_tokens: Vec<DeployedToken>,
    pub last_processed_tx: Option<String>,
    #[serde(default)]
    pub pending: Vec<PendingDeployment>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl DeploymentStateDoc {
    pub fn new(state: &DeploymentState) -> Self {
        let now = Utc::now().timestamp() as u64;
        Self {
            id: None,
            recent_tokens: state.recent_tokens.clone(),
            last_processed_tx: state.last_processed_tx.clone(),
            pending: state.pending.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<DeploymentStateDoc> for DeploymentState {
    fn from(doc: DeploymentStateDoc) -> Self {
        Self {
            recent_tokens: doc.recent_tokens,
            last_processed_tx: doc.last_processed_tx,
            pending: doc.pending,
        }
    }
}
