//! Maps internal failures onto HTTP responses.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Result alias used by handlers.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request input failed validation (bad file type, missing field, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested BCN has no transactions on file.
    #[error("not found: {0}")]
    NotFound(String),

    /// Spreadsheet parsing failed outright.
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// Anything else unexpected.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation(_) => HttpResponse::BadRequest().json(body("ValidationError", self)),
            ServiceError::NotFound(_) => HttpResponse::NotFound().json(body("NotFound", self)),
            ServiceError::Ingestion(_) => HttpResponse::BadRequest().json(body("IngestionError", self)),
            ServiceError::Internal(_) => {
                HttpResponse::InternalServerError().json(body("InternalError", self))
            }
        }
    }
}

fn body(error: &str, err: &ServiceError) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        details: None,
    }
}
