use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::Http;
use alloy::transports::layers::FallbackLayer;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::num::NonZeroUsize;
use tower::ServiceBuilder;
use url::Url;

use super::contracts::{IErc20Factory, IGovernance};
use super::{classify_broadcast_error, ChainReader, TxReceipt, Wallet, WalletError};
use crate::config::NetworkConfig;
use crate::database::models::utils::address_to_string;
use crate::deployment::validator::ValidatedRequest;
use crate::governance::ProposalRecord;

/// Build an RPC client that fails over across every configured endpoint
pub fn create_rpc_client(rpcs: &[String]) -> Result<RpcClient> {
    let active_transports = NonZeroUsize::new(rpcs.len())
        .ok_or_else(|| anyhow!("At least one RPC URL is required"))?;
    let fallback_layer = FallbackLayer::default().with_active_transport_count(active_transports);

    let transports = rpcs
        .iter()
        .map(|url| {
            let url = url
                .parse::<Url>()
                .with_context(|| format!("Invalid RPC URL: {}", url))?;
            Ok(Http::new(url))
        })
        .collect::<Result<Vec<_>>>()?;

    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);
    Ok(RpcClient::builder().transport(transport, false))
}

/// JSON-RPC backed chain access for the Helios network.
///
/// Reads go through a plain provider. Writes need a configured deployer key;
/// without one the wallet reports no connected account.
pub struct HeliosChain {
    provider: DynProvider,
    signer_provider: Option<DynProvider>,
    account: Option<Address>,
    factory_address: Address,
    governance_address: Address,
}

impl HeliosChain {
    pub fn from_config(network: &NetworkConfig) -> Result<Self> {
        let client = create_rpc_client(&network.rpcs)?;
        let provider = ProviderBuilder::new().connect_client(client.clone()).erased();

        let (signer_provider, account) = match &network.private_key {
            Some(key) if !key.trim().is_empty() => {
                let signer = key
                    .trim()
                    .parse::<PrivateKeySigner>()
                    .context("Invalid deployer private key")?;
                let account = signer.address();
                info!("Deployer wallet connected: {}", address_to_string(&account));
                let signer_provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_client(client)
                    .erased();
                (Some(signer_provider), Some(account))
            }
            _ => {
                info!("No deployer key configured, token deployment is disabled");
                (None, None)
            }
        };

        Ok(Self {
            provider,
            signer_provider,
            account,
            factory_address: network.erc20_factory_address.parse()?,
            governance_address: network.governance_address.parse()?,
        })
    }
}

fn map_send_error(err: alloy::contract::Error) -> WalletError {
    let code = match &err {
        alloy::contract::Error::TransportError(rpc_err) => {
            rpc_err.as_error_resp().map(|payload| payload.code)
        }
        _ => None,
    };
    classify_broadcast_error(code, &err.to_string())
}

#[async_trait]
impl Wallet for HeliosChain {
    fn address(&self) -> Option<Address> {
        self.account
    }

    async fn chain_id(&self) -> Result<u64> {
        let provider = self
            .signer_provider
            .as_ref()
            .ok_or_else(|| anyhow!("No wallet connected"))?;
        Ok(provider.get_chain_id().await?)
    }

    async fn create_erc20(&self, request: &ValidatedRequest) -> Result<TxHash, WalletError> {
        let provider = self
            .signer_provider
            .clone()
            .ok_or_else(|| WalletError::Other("No wallet connected".to_string()))?;

        debug!(
            "Sending createErc20 for {} ({}) to {}",
            request.name,
            request.symbol,
            address_to_string(&self.factory_address)
        );

        let factory = IErc20Factory::new(self.factory_address, provider);
        let pending = factory
            .createErc20(
                request.name.clone(),
                request.symbol.clone(),
                request.denom.clone(),
                request.total_supply_raw,
                request.decimals,
                request.logo_base64.clone().unwrap_or_default(),
            )
            .send()
            .await
            .map_err(map_send_error)?;

        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl ChainReader for HeliosChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.as_ref().map(TxReceipt::from))
    }

    async fn transaction_known(&self, tx_hash: TxHash) -> Result<bool> {
        let transaction = self.provider.get_transaction_by_hash(tx_hash).await?;
        Ok(transaction.is_some())
    }

    async fn proposals(&self, page: u64, page_size: u64) -> Result<Vec<ProposalRecord>> {
        let governance = IGovernance::new(self.governance_address, self.provider.clone());
        let proposals = governance
            .getProposalsByPageAndSize(page, page_size)
            .call()
            .await?;
        Ok(proposals.into_iter().map(ProposalRecord::from).collect())
    }
}
