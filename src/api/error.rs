use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::ledger::LedgerError;

/// HTTP-facing error: ledger failures plus malformed requests
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Ledger(e) => e.kind(),
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unavailable(_) => "unavailable",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(e) => match e {
                LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                LedgerError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
                LedgerError::AddressRequired { .. }
                | LedgerError::OutOfStock { .. }
                | LedgerError::InvalidQuantity(_)
                | LedgerError::EmptyCart
                | LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::InvalidTransition { .. } | LedgerError::StorageConflict { .. } => {
                    StatusCode::CONFLICT
                }
                LedgerError::Forbidden { .. } => StatusCode::FORBIDDEN,
                LedgerError::InvariantViolation(_) | LedgerError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Role;
    use crate::domain::order::OrderStatus;
    use crate::ledger::EntityKind;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (LedgerError::not_found(EntityKind::Order, Uuid::nil()), StatusCode::NOT_FOUND),
            (
                LedgerError::InsufficientBalance { required: 60, available: 40 },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (LedgerError::EmptyCart, StatusCode::UNPROCESSABLE_ENTITY),
            (
                LedgerError::InvalidTransition {
                    order_id: Uuid::nil(),
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Canceled,
                    stale: false,
                },
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::Forbidden { role: Role::Buyer, action: "ship orders" },
                StatusCode::FORBIDDEN,
            ),
            (
                LedgerError::InvariantViolation("stock underflow".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status_code(), status);
        }
        assert_eq!(ApiError::BadRequest("x".to_string()).status_code(), StatusCode::BAD_REQUEST);
    }
}
