use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use mongodb::error::Error as MongoError;
use serde_json::json;

use crate::deployment::DeployError;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Internal server error")]
    InternalError,

    #[display(fmt = "Bad request: {}", _0)]
    BadRequest(String),

    #[display(fmt = "Not found: {}", _0)]
    NotFound(String),

    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "Database error: {}", _0)]
    DatabaseError(String),

    #[display(fmt = "Chain error: {}", _0)]
    ChainError(String),

    #[display(fmt = "Service unavailable: {}", _0)]
    ServiceUnavailable(String),

    #[display(fmt = "Unauthorized: {}", _0)]
    Unauthorized(String),
}

impl From<MongoError> for ApiError {
    fn from(error: MongoError) -> Self {
        log::error!("MongoDB error: {}", error);
        ApiError::DatabaseError(error.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);
        ApiError::InternalError
    }
}

impl From<DeployError> for ApiError {
    fn from(error: DeployError) -> Self {
        match error {
            DeployError::Validation(_) | DeployError::WrongNetwork { .. } => {
                ApiError::BadRequest(error.to_string())
            }
            DeployError::Busy | DeployError::AlreadyProcessed(_) => {
                ApiError::Conflict(error.to_string())
            }
            DeployError::UnknownTransaction(_) => ApiError::NotFound(error.to_string()),
            DeployError::WalletNotConnected
            | DeployError::WalletUnavailable(_)
            | DeployError::Overloaded(_) => ApiError::ServiceUnavailable(error.to_string()),
            DeployError::Rejected | DeployError::Cancelled => ApiError::Conflict(error.to_string()),
            DeployError::Store(message) => ApiError::DatabaseError(message),
            DeployError::Broadcast(_)
            | DeployError::Timeout(_)
            | DeployError::Reverted(_)
            | DeployError::ExtractionFailed(_)
            | DeployError::Chain(_) => ApiError::ChainError(error.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::InternalError => HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })),
            ApiError::BadRequest(ref message) => HttpResponse::BadRequest().json(json!({
                "error": message
            })),
            ApiError::NotFound(ref message) => HttpResponse::NotFound().json(json!({
                "error": message
            })),
            ApiError::Conflict(ref message) => HttpResponse::Conflict().json(json!({
                "error": message
            })),
            ApiError::DatabaseError(ref message) => {
                HttpResponse::InternalServerError().json(json!({
                    "error": format!("Database error: {}", message)
                }))
            }
            ApiError::ChainError(ref message) => HttpResponse::BadGateway().json(json!({
                "error": message
            })),
            ApiError::ServiceUnavailable(ref message) => {
                HttpResponse::ServiceUnavailable().json(json!({
                    "error": message
                }))
            }
            ApiError::Unauthorized(ref message) => HttpResponse::Unauthorized().json(json!({
                "error": message
            })),
        }
    }
}
