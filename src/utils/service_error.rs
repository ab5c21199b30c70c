// Service error taxonomy shared by every pipeline in the core
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::aggregator::AggregatorError;
use crate::services::planning::PlanningError;

/// Which batch a partial write belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Accounts,
    Transactions,
    PaymentTasks,
}

impl std::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStage::Accounts => write!(f, "accounts"),
            WriteStage::Transactions => write!(f, "transactions"),
            WriteStage::PaymentTasks => write!(f, "payment tasks"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    /// A uniqueness rule of the store was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rows written before the failure are left in place
    #[error("Partial write of {stage} after {written} rows: {reason}")]
    PartialWriteFailure {
        stage: WriteStage,
        written: usize,
        reason: String,
    },
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            ServiceError::PartialWriteFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion from various error types
impl From<diesel::result::Error> for ServiceError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => ServiceError::NotFound("record".to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                ref info,
            ) => ServiceError::Conflict(info.message().to_string()),
            _ => ServiceError::UpstreamFailure(error.to_string()),
        }
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for ServiceError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        ServiceError::UpstreamFailure(format!("Database pool error: {}", error))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationFailure(error.to_string())
    }
}

impl From<AggregatorError> for ServiceError {
    fn from(error: AggregatorError) -> Self {
        ServiceError::UpstreamFailure(error.to_string())
    }
}

impl From<PlanningError> for ServiceError {
    fn from(error: PlanningError) -> Self {
        ServiceError::UpstreamFailure(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        let err: ServiceError = diesel::result::Error::NotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err: ServiceError = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        )
        .into();
        assert!(matches!(err, ServiceError::Conflict(ref msg) if msg.contains("duplicate key")));
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (ServiceError::NotFound("token".into()), StatusCode::NOT_FOUND),
            (
                ServiceError::ValidationFailure("bad id".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Conflict("token exists".into()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::UpstreamFailure("plaid down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::PartialWriteFailure {
                    stage: WriteStage::Transactions,
                    written: 3,
                    reason: "timeout".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_partial_write_message_names_stage() {
        let err = ServiceError::PartialWriteFailure {
            stage: WriteStage::Accounts,
            written: 2,
            reason: "connection reset".into(),
        };
        assert_eq!(
            err.to_string(),
            "Partial write of accounts after 2 rows: connection reset"
        );
    }
}
