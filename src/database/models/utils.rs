use alloy::primitives::{Address, TxHash, U256};

/// Helper function to convert an Address to a lower-case 0x string for storage
pub fn address_to_string(address: &Address) -> String {
    format!("{:?}", address)
}

pub fn tx_hash_to_string(tx_hash: &TxHash) -> String {
    format!("{:?}", tx_hash)
}

/// Helper function to convert a U256 to a decimal string
pub fn u256_to_string(value: &U256) -> String {
    value.to_string()
}
