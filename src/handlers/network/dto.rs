use serde::Serialize;

// Response for GET /network/status
#[derive(Debug, Serialize)]
pub struct NetworkStatusResponse {
    pub name: String,
    pub chain_id: u64,
    pub required_chain_id: u64,
    pub chain_matches: bool,
    pub block_number: u64,
    pub gas_price: String, // wei, decimal string
    pub erc20_factory_address: String,
    pub governance_address: String,
    pub block_explorer: Option<String>,
    pub deployer_connected: bool,
}
