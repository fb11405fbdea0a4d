use actix_web::{web, HttpResponse, Result};
use log::{error, info, warn};
use std::sync::Arc;

use crate::{
    chain::{ChainReader, Wallet},
    config::Config,
    errors::ApiError,
    handlers::network::service::NetworkService,
};

/// GET /network/status - Node chain id, head block and gas price against the required chain
pub async fn get_network_status_handler(
    chain: web::Data<dyn ChainReader>,
    wallet: web::Data<dyn Wallet>,
    config: web::Data<Arc<Config>>,
) -> Result<HttpResponse, ApiError> {
    info!("Handling GET /network/status request");

    match NetworkService::get_status(chain.get_ref(), wallet.get_ref(), &config.network).await {
        Ok(status) => {
            if !status.chain_matches {
                warn!(
                    "Node is on chain {}, expected {}",
                    status.chain_id, status.required_chain_id
                );
            }
            Ok(HttpResponse::Ok().json(status))
        }
        Err(e) => {
            error!("Failed to query network status: {}", e);
            Err(ApiError::ChainError(format!(
                "Failed to query network status: {}",
                e
            )))
        }
    }
}
