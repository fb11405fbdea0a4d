pub mod deployment;
pub mod utils;

pub use deployment::DeploymentStateDoc;
pub use utils::{address_to_string, tx_hash_to_string, u256_to_string};
