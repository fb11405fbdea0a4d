use alloy::primitives::TxHash;

use super::validator::ValidationError;

pub const OVERLOADED_MESSAGE: &str =
    "The network is currently overloaded. Please try again in a few moments.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("Could not reach the wallet: {0}")]
    WalletUnavailable(String),

    #[error("Please switch to the Helios network (expected chain {expected}, wallet is on {actual})")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("A token deployment is already in progress")]
    Busy,

    #[error("Transaction was rejected in the wallet")]
    Rejected,

    #[error("{}", OVERLOADED_MESSAGE)]
    Overloaded(String),

    #[error("Failed to submit transaction: {0}")]
    Broadcast(String),

    #[error("Deployment was cancelled")]
    Cancelled,

    #[error("{0}")]
    Timeout(String),

    #[error("Transaction {0:?} reverted")]
    Reverted(TxHash),

    #[error("Could not determine deployed token address")]
    ExtractionFailed(TxHash),

    #[error("Transaction {0:?} was already processed")]
    AlreadyProcessed(TxHash),

    #[error("No deployment is known for transaction {0:?}")]
    UnknownTransaction(TxHash),

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("Deployment store error: {0}")]
    Store(String),
}
