use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::warn;
use std::sync::Arc;

use crate::config::Config;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key extractor guarding the write endpoints
pub struct ApiKey(pub String);

#[derive(Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Accepted,
    /// No key configured, every caller is let through
    Open,
    Missing,
    Invalid,
}

pub fn check_api_key(configured: Option<&str>, provided: Option<&str>) -> AuthOutcome {
    match (configured, provided) {
        (None, _) => AuthOutcome::Open,
        (Some(_), None) => AuthOutcome::Missing,
        (Some(expected), Some(key)) if expected == key => AuthOutcome::Accepted,
        (Some(_), Some(_)) => AuthOutcome::Invalid,
    }
}

impl FromRequest for ApiKey {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<Arc<Config>>>() else {
            warn!("Config not found in app data");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Configuration error",
            )));
        };

        let header_key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match check_api_key(config.server.api_key.as_deref(), header_key) {
            AuthOutcome::Accepted => ready(Ok(ApiKey(header_key.unwrap_or_default().to_string()))),
            AuthOutcome::Open => {
                warn!("API key not configured, allowing access");
                ready(Ok(ApiKey(header_key.unwrap_or_default().to_string())))
            }
            AuthOutcome::Missing => {
                warn!("API key required but not provided");
                ready(Err(actix_web::error::ErrorUnauthorized("API key required")))
            }
            AuthOutcome::Invalid => {
                warn!("Invalid API key provided");
                ready(Err(actix_web::error::ErrorUnauthorized("Invalid API key")))
            }
        }
    }
}
