//! HTTP error type for the resource handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no {collection} with id '{id}'")]
    NotFound { collection: &'static str, id: String },

    #[error("no {collection} stored yet")]
    EmptyCollection { collection: &'static str },

    #[error("need content-type 'application/json', but got '{0}'")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("401 - unauthorized")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } | ApiError::EmptyCollection { .. } => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Map a body decoding failure. `content_type` is the raw request header,
    /// empty when absent.
    pub fn from_json_rejection(rejection: JsonRejection, content_type: &str) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::UnsupportedMediaType(content_type.to_string())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
