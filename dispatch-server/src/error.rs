//! Translates `DispatchError` into an HTTP response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use dispatch_core::DispatchError;

pub struct AppError(pub DispatchError);

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::warn!(error = %self.0, status = status.as_u16(), "request failed");
        (status, self.0.to_string()).into_response()
    }
}
