use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CustodianError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ractor error: {0}")]
    Ractor(String),

    #[error("Option not found: {0}")]
    OptionNotFound(String),
}

impl IntoResponse for CustodianError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CustodianError::Database(_) | CustodianError::Ractor(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (status, body)
            }

            CustodianError::OptionNotFound(name) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "OPTION_NOT_FOUND".to_string(),
                    message: format!("No option named '{name}'."),
                    details: None,
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
