use anyhow::Result;
use futures::try_join;
use log::debug;

use crate::{
    chain::{ChainReader, Wallet},
    config::NetworkConfig,
    handlers::network::dto::NetworkStatusResponse,
};

/// Service layer for network status
pub struct NetworkService;

impl NetworkService {
    pub async fn get_status(
        chain: &dyn ChainReader,
        wallet: &dyn Wallet,
        network: &NetworkConfig,
    ) -> Result<NetworkStatusResponse> {
        let (chain_id, block_number, gas_price) =
            try_join!(chain.chain_id(), chain.block_number(), chain.gas_price())?;
        debug!(
            "Node reports chain {} at block {}, gas price {}",
            chain_id, block_number, gas_price
        );

        Ok(NetworkStatusResponse {
            name: network.name.clone(),
            chain_id,
            required_chain_id: network.chain_id,
            chain_matches: chain_id == network.chain_id,
            block_number,
            gas_price: gas_price.to_string(),
            erc20_factory_address: network.erc20_factory_address.clone(),
            governance_address: network.governance_address.clone(),
            block_explorer: network.block_explorer.clone(),
            deployer_connected: wallet.address().is_some(),
        })
    }
}
