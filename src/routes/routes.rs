use actix_web::{web, HttpResponse, Result};

use crate::routes::{
    deployment::configure_deployment_routes, governance::configure_governance_routes,
    network::configure_network_routes,
};

/// Health check endpoint
async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "ok"})))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_deployment_routes)
            .configure(configure_governance_routes)
            .configure(configure_network_routes),
    );
}
