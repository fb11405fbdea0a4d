use alloy::primitives::{Address, TxHash};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::validator::ValidatedRequest;
use crate::database::models::utils::{address_to_string, tx_hash_to_string};

pub const HISTORY_CAPACITY: usize = 10;
pub const PENDING_CAPACITY: usize = 20;

/// A broadcast creation whose token has not been recorded yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDeployment {
    pub tx_hash: String,
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub decimals: u8,
    pub logo_base64: Option<String>,
    pub submitted_at: u64,
}

impl PendingDeployment {
    pub fn new(request: &ValidatedRequest, tx_hash: TxHash) -> Self {
        Self {
            tx_hash: tx_hash_to_string(&tx_hash),
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            denom: request.denom.clone(),
            total_supply: request.total_supply.clone(),
            decimals: request.decimals,
            logo_base64: request.logo_base64.clone(),
            submitted_at: Utc::now().timestamp() as u64,
        }
    }
}

/// A token created through the dApp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub decimals: u8,
    pub logo_base64: Option<String>,
    pub tx_hash: String,
    pub timestamp: u64,
}

impl DeployedToken {
    pub fn new(address: Address, pending: &PendingDeployment) -> Self {
        Self {
            address: address_to_string(&address),
            name: pending.name.clone(),
            symbol: pending.symbol.clone(),
            denom: pending.denom.clone(),
            total_supply: pending.total_supply.clone(),
            decimals: pending.decimals,
            logo_base64: pending.logo_base64.clone(),
            tx_hash: pending.tx_hash.clone(),
            timestamp: Utc::now().timestamp() as u64,
        }
    }
}

/// Recent deployments (most recent first), the last handle already turned into a
/// token, and broadcast handles still waiting to be recorded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentState {
    pub recent_tokens: Vec<DeployedToken>,
    pub last_processed_tx: Option<String>,
    #[serde(default)]
    pub pending: Vec<PendingDeployment>,
}

impl DeploymentState {
    pub fn is_processed(&self, tx_hash: &TxHash) -> bool {
        self.last_processed_tx.as_deref() == Some(tx_hash_to_string(tx_hash).as_str())
    }

    pub fn find_by_tx(&self, tx_hash: &TxHash) -> Option<&DeployedToken> {
        let tx_hash = tx_hash_to_string(tx_hash);
        self.recent_tokens.iter().find(|token| token.tx_hash == tx_hash)
    }

    pub fn find_pending(&self, tx_hash: &TxHash) -> Option<&PendingDeployment> {
        let tx_hash = tx_hash_to_string(tx_hash);
        self.pending.iter().find(|pending| pending.tx_hash == tx_hash)
    }

    /// Whether the handle was broadcast through this service, recorded or not
    pub fn knows(&self, tx_hash: &TxHash) -> bool {
        self.is_processed(tx_hash)
            || self.find_by_tx(tx_hash).is_some()
            || self.find_pending(tx_hash).is_some()
    }

    /// Remember a broadcast handle, newest first, oldest dropped past capacity
    pub fn add_pending(&mut self, pending: PendingDeployment) {
        self.pending.retain(|known| known.tx_hash != pending.tx_hash);
        self.pending.insert(0, pending);
        self.pending.truncate(PENDING_CAPACITY);
    }

    /// Prepend a token, trim the history, mark its transaction processed and
    /// drop it from the pending list
    pub fn record(&mut self, token: DeployedToken) {
        self.pending.retain(|pending| pending.tx_hash != token.tx_hash);
        self.last_processed_tx = Some(token.tx_hash.clone());
        self.recent_tokens.insert(0, token);
        self.recent_tokens.truncate(HISTORY_CAPACITY);
    }
}

/// Persistence for [`DeploymentState`]. Writers load, modify and save under their own lock.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    async fn load(&self) -> Result<DeploymentState>;

    async fn save(&self, state: &DeploymentState) -> Result<()>;
}

/// Process-local store used when no database is configured
#[derive(Debug, Default)]
pub struct MemoryDeploymentStore {
    state: RwLock<DeploymentState>,
}

impl MemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: DeploymentState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl DeploymentStore for MemoryDeploymentStore {
    async fn load(&self) -> Result<DeploymentState> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &DeploymentState) -> Result<()> {
        *self.state.write().await = state.clone();
        Ok(())
    }
}
