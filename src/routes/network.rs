use actix_web::web;

use crate::handlers::network::get_network_status_handler;

pub fn configure_network_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/network/status", web::get().to(get_network_status_handler));
}
