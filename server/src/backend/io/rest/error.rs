//! HTTP translation of [`LedgerError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ApiErrorBody;
use tracing::error;

use crate::backend::domain::errors::LedgerError;

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::InvalidOperation(_) => StatusCode::CONFLICT,
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::CorruptRecord(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ApiErrorBody {
        let issues = match self {
            LedgerError::Validation(issues) => issues.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        };
        ApiErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
            issues,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(self.to_body())).into_response()
    }
}
