//! Mapping of turn errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mongochat_application::RunTurnError;
use serde_json::json;

/// HTTP-facing wrapper around [`RunTurnError`].
#[derive(Debug)]
pub struct ApiError(pub RunTurnError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RunTurnError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RunTurnError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
            RunTurnError::Cancelled | RunTurnError::Execution(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RunTurnError> for ApiError {
    fn from(e: RunTurnError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({"error": self.0.to_string()}));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError(RunTurnError::InvalidQuery("empty".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(RunTurnError::TimedOut).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError(RunTurnError::Execution("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
