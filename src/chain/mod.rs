pub mod contracts;
pub mod provider;
pub mod receipt;

pub use provider::HeliosChain;
pub use receipt::{ReceiptLog, TxReceipt};

use alloy::primitives::{Address, TxHash};
use anyhow::Result;
use async_trait::async_trait;

use crate::deployment::validator::ValidatedRequest;
use crate::governance::ProposalRecord;

/// Why a broadcast did not produce a transaction hash
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("User rejected the transaction")]
    Rejected,

    #[error("Provider overloaded: {0}")]
    Overloaded(String),

    #[error("{0}")]
    Other(String),
}

/// Signs and broadcasts transactions on behalf of the connected account
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connected account, `None` when no identity is available
    fn address(&self) -> Option<Address>;

    /// Chain the wallet is currently signing for
    async fn chain_id(&self) -> Result<u64>;

    /// Broadcast `createErc20` on the token factory precompile
    async fn create_erc20(&self, request: &ValidatedRequest) -> Result<TxHash, WalletError>;
}

/// Read-only chain queries
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>>;

    /// Whether the node knows the transaction at all (mined or still pending)
    async fn transaction_known(&self, tx_hash: TxHash) -> Result<bool>;

    /// One page of governance proposals, `page` is one-based
    async fn proposals(&self, page: u64, page_size: u64) -> Result<Vec<ProposalRecord>>;
}

/// Sort a JSON-RPC failure into the wallet error taxonomy.
///
/// EIP-1193 code 4001 means the user declined; -32005 and HTTP 429 are rate limits.
pub fn classify_broadcast_error(code: Option<i64>, message: &str) -> WalletError {
    let lowered = message.to_lowercase();
    match code {
        Some(4001) => return WalletError::Rejected,
        Some(-32005) | Some(429) => return WalletError::Overloaded(message.to_string()),
        _ => {}
    }
    if lowered.contains("user rejected") || lowered.contains("user denied") {
        WalletError::Rejected
    } else if lowered.contains("overloaded")
        || lowered.contains("too many requests")
        || lowered.contains("rate limit")
    {
        WalletError::Overloaded(message.to_string())
    } else {
        WalletError::Other(message.to_string())
    }
}
