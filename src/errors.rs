use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::{DomainError, OrderRejection};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Rejected(OrderRejection),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Rejected(reason) => AppError::Rejected(reason),
            other @ (DomainError::ConcurrentModification { .. }
            | DomainError::Persistence(_)
            | DomainError::Notification(_)) => AppError::Internal(other.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Rejected(reason) => {
                HttpResponse::UnprocessableEntity().json(serde_json::json!({
                    "error": reason.to_string(),
                    "code": reason.code()
                }))
            }
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}
