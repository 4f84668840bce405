use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dealfeed_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized - invalid or missing JWT token")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed")]
    Invalid(Vec<ValidationError>),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl From<Vec<ValidationError>> for AppError {
    fn from(errors: Vec<ValidationError>) -> Self {
        AppError::Invalid(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match self {
            AppError::Invalid(errors) => {
                (status, Json(serde_json::json!({ "errors": errors }))).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
