use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use alumnet_common::{ApiError, AppError};

use crate::models::BookingStatus;

/// Domain errors for the booking/reputation core. Validation errors are
/// rejected before any state change; state-conflict errors reflect a real
/// race or stale client data and are reported, never coerced.
#[derive(Error, Debug)]
pub enum WorkshopError {
    #[error("Workshop is not accepting bookings")]
    WorkshopInactive,

    #[error("Student already has an active booking for this workshop")]
    DuplicateBooking,

    #[error("Workshop is fully booked")]
    CapacityExceeded,

    #[error("Cannot move booking from {from} to {target}")]
    InvalidTransition {
        from: BookingStatus,
        target: BookingStatus,
    },

    #[error("Not eligible to submit feedback: {0}")]
    NotEligible(String),

    #[error("Rating must be an integer between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl WorkshopError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkshopError::WorkshopInactive
            | WorkshopError::DuplicateBooking
            | WorkshopError::CapacityExceeded
            | WorkshopError::InvalidTransition { .. }
            | WorkshopError::NotEligible(_) => StatusCode::CONFLICT,
            WorkshopError::InvalidRating(_) | WorkshopError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkshopError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkshopError::Forbidden(_) => StatusCode::FORBIDDEN,
            WorkshopError::Store(inner) => inner.status_code(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WorkshopError::WorkshopInactive => "WORKSHOP_INACTIVE",
            WorkshopError::DuplicateBooking => "DUPLICATE_BOOKING",
            WorkshopError::CapacityExceeded => "CAPACITY_EXCEEDED",
            WorkshopError::InvalidTransition { .. } => "INVALID_TRANSITION",
            WorkshopError::NotEligible(_) => "NOT_ELIGIBLE",
            WorkshopError::InvalidRating(_) => "INVALID_RATING",
            WorkshopError::Validation(_) => "VALIDATION_ERROR",
            WorkshopError::NotFound(_) => "NOT_FOUND",
            WorkshopError::Forbidden(_) => "FORBIDDEN",
            WorkshopError::Store(inner) => inner.error_code(),
        }
    }
}

impl From<validator::ValidationErrors> for WorkshopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        WorkshopError::Validation(errors.to_string())
    }
}

impl IntoResponse for WorkshopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = ApiError::new(self.error_code().to_string(), self.to_string());
        (status, Json(body)).into_response()
    }
}
