use actix_web::web;

use crate::handlers::deployment::{
    cancel_deployment_handler, deploy_token_handler, get_deployment_status_handler,
    get_recent_tokens_handler, resume_deployment_handler,
};

pub fn configure_deployment_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/tokens/deploy", web::post().to(deploy_token_handler))
        .route("/tokens/recent", web::get().to(get_recent_tokens_handler))
        .route(
            "/tokens/deployment",
            web::get().to(get_deployment_status_handler),
        )
        .route(
            "/tokens/deployment/cancel",
            web::post().to(cancel_deployment_handler),
        )
        .route(
            "/tokens/deployment/resume/{tx_hash}",
            web::post().to(resume_deployment_handler),
        );
}
