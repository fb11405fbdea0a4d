use actix_web::web;

use crate::handlers::governance::get_proposals_handler;

pub fn configure_governance_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/governance/proposals",
        web::get().to(get_proposals_handler),
    );
}
