use actix_web::{web, HttpResponse, Result};
use log::{error, info};

use crate::{
    chain::ChainReader,
    errors::ApiError,
    handlers::governance::{dto::ProposalsQuery, service::GovernanceService},
};

/// GET /governance/proposals?page=&page_size= - One page of governance proposals
///
/// # Returns
/// JSON object with the proposals and what is known about the last page
pub async fn get_proposals_handler(
    chain: web::Data<dyn ChainReader>,
    query: web::Query<ProposalsQuery>,
) -> Result<HttpResponse, ApiError> {
    let (page, page_size) = (query.page(), query.page_size());
    info!(
        "Handling GET /governance/proposals request (page {}, size {})",
        page, page_size
    );

    if page == 0 {
        return Err(ApiError::BadRequest("page must be 1 or greater".to_string()));
    }

    match GovernanceService::get_proposals(chain.get_ref(), page, page_size).await {
        Ok(response) => {
            info!("Retrieved {} proposals", response.proposals.len());
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            error!("Failed to retrieve proposals: {}", e);
            if e.to_string().contains("page_size") {
                Err(ApiError::BadRequest(e.to_string()))
            } else {
                Err(ApiError::ChainError(format!(
                    "Failed to retrieve proposals: {}",
                    e
                )))
            }
        }
    }
}
