use actix_web::{web, HttpResponse, Result};
use alloy::primitives::TxHash;
use log::{error, info};
use std::sync::Arc;

use crate::{
    config::Config,
    database::models::utils::tx_hash_to_string,
    deployment::{DeploymentOrchestrator, TokenCreationRequest},
    errors::ApiError,
    handlers::{
        auth::ApiKey,
        deployment::dto::{explorer_tx_url, DeployResponse, RecentTokensResponse},
    },
};

/// Follow the receipt in the background; the status endpoint reports the outcome
fn spawn_tracking(orchestrator: Arc<DeploymentOrchestrator>, tx_hash: TxHash) {
    tokio::spawn(async move {
        let status = orchestrator.track(tx_hash).await;
        info!("Tracking of {:?} finished: {:?}", tx_hash, status);
    });
}

/// POST /tokens/deploy - Validate and broadcast a token creation
/// Requires API key authentication via X-API-Key header
///
/// Returns 202 with the transaction hash once broadcast. Confirmation is tracked
/// in the background.
pub async fn deploy_token_handler(
    _api_key: ApiKey,
    orchestrator: web::Data<DeploymentOrchestrator>,
    config: web::Data<Arc<Config>>,
    body: web::Json<TokenCreationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    info!("Handling POST /tokens/deploy request for {}", request.symbol);

    let tx_hash = orchestrator.submit(&request).await.map_err(|e| {
        error!("Token deployment not submitted: {}", e);
        ApiError::from(e)
    })?;

    let status = orchestrator.status().await;
    spawn_tracking(orchestrator.into_inner(), tx_hash);

    let tx_hash = tx_hash_to_string(&tx_hash);
    Ok(HttpResponse::Accepted().json(DeployResponse {
        explorer_url: explorer_tx_url(config.network.block_explorer.as_deref(), &tx_hash),
        tx_hash,
        status,
    }))
}

/// GET /tokens/deployment - Current deployment status
pub async fn get_deployment_status_handler(
    orchestrator: web::Data<DeploymentOrchestrator>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(orchestrator.status().await))
}

/// POST /tokens/deployment/cancel - Cancel before broadcast, or stop tracking after it
pub async fn cancel_deployment_handler(
    _api_key: ApiKey,
    orchestrator: web::Data<DeploymentOrchestrator>,
) -> Result<HttpResponse, ApiError> {
    info!("Handling POST /tokens/deployment/cancel request");
    Ok(HttpResponse::Ok().json(orchestrator.cancel().await))
}

/// POST /tokens/deployment/resume/{tx_hash} - Track a previously submitted transaction again
pub async fn resume_deployment_handler(
    _api_key: ApiKey,
    orchestrator: web::Data<DeploymentOrchestrator>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw = path.into_inner();
    info!("Handling POST /tokens/deployment/resume/{} request", raw);

    let tx_hash: TxHash = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid transaction hash '{}'", raw)))?;

    orchestrator.resume(tx_hash).await?;
    let status = orchestrator.status().await;
    spawn_tracking(orchestrator.into_inner(), tx_hash);

    Ok(HttpResponse::Accepted().json(status))
}

/// GET /tokens/recent - Recently deployed tokens, most recent first
pub async fn get_recent_tokens_handler(
    orchestrator: web::Data<DeploymentOrchestrator>,
) -> Result<HttpResponse, ApiError> {
    match orchestrator.recent_tokens().await {
        Ok(tokens) => {
            info!("Retrieved {} recent tokens", tokens.len());
            Ok(HttpResponse::Ok().json(RecentTokensResponse::new(tokens)))
        }
        Err(e) => {
            error!("Failed to load recent tokens: {}", e);
            Err(ApiError::DatabaseError(format!(
                "Failed to load recent tokens: {}",
                e
            )))
        }
    }
}
