//! Error handling for the WMS Basic platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{MovementError, RangeError, StockError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field-level validation error with both translations
    pub fn validation(field: &str, message: &str, message_es: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_es: message_es.to_string(),
        }
    }
}

/// Field named by a `<table>_<field>_key` constraint
fn constraint_field(constraint: &str) -> String {
    let trimmed = constraint.strip_suffix("_key").unwrap_or(constraint);
    match trimmed.split_once('_') {
        Some((_, field)) if !field.is_empty() => field.to_string(),
        _ => trimmed.to_string(),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("record").to_string();
            if db_err.is_unique_violation() {
                return AppError::DuplicateEntry(constraint_field(&constraint));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict {
                    resource: constraint,
                    message: "The record is referenced by or references other records".to_string(),
                    message_es: "El registro está relacionado con otros registros".to_string(),
                };
            }
        }
        AppError::DatabaseError(err)
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            StockError::Overflow => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        let message_es = match &err {
            MovementError::NonPositiveQuantity => "La cantidad debe ser positiva".to_string(),
            MovementError::MissingOrigin(_) => {
                "Debe seleccionar un depósito origen".to_string()
            }
            MovementError::MissingDestination(_) => {
                "Debe seleccionar un depósito destino".to_string()
            }
            MovementError::PositionWithoutWarehouse => {
                "La posición requiere su depósito".to_string()
            }
            MovementError::SameLocation => {
                "El origen y el destino no pueden ser la misma ubicación".to_string()
            }
            MovementError::PalletsOnNonEntry => {
                "Solo las entradas pueden incluir pallets".to_string()
            }
        };
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
            message_es,
        }
    }
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        let message_es = match &err {
            RangeError::NotALetter { .. } => "Rack y columna deben ser una letra".to_string(),
            RangeError::BelowOne { .. } => "Nivel y profundidad comienzan en 1".to_string(),
            RangeError::Reversed { .. } => "El inicio del rango es posterior al fin".to_string(),
            RangeError::TooLarge { requested, limit } => format!(
                "El rango generaría {} posiciones, el límite es {}",
                requested, limit
            ),
        };
        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
            message_es,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message, message_es } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("Datos inválidos: {}", msg),
                    field: None,
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_es: format!("Ya existe un registro con este {}", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::Conflict { resource, message, message_es } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: message.clone(),
                    message_es: message_es.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_es: format!("No se encontró {}", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_es: format!("No se puede cambiar el estado: {}", msg),
                    field: None,
                },
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: msg.clone(),
                    message_es: "No hay suficiente stock disponible".to_string(),
                    field: Some("quantity".to_string()),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_es: "Ocurrió un error en la base de datos".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::MovementType;

    #[test]
    fn test_stock_error_maps_to_unprocessable() {
        let err: AppError = StockError::InsufficientStock {
            available: Decimal::ONE,
            requested: Decimal::TWO,
        }
        .into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail.code, "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_movement_error_keeps_field() {
        let err: AppError = MovementError::MissingOrigin(MovementType::Exit).into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("origin_warehouse_id"));
        assert_eq!(detail.message_es, "Debe seleccionar un depósito origen");
    }

    #[test]
    fn test_range_error_maps_to_validation() {
        let err: AppError = RangeError::Reversed { dimension: "column" }.into();
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("column"));
    }

    #[test]
    fn test_constraint_field() {
        assert_eq!(constraint_field("products_code_key"), "code");
        assert_eq!(constraint_field("positions_coordinate_key"), "coordinate");
        assert_eq!(constraint_field("record"), "record");
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
