//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; any `CodeError` converts with `?`
//! and renders as a JSON [`ErrorResponse`] with the variant's status code.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qrgen_core::{CodeError, ErrorMetadata, LogLevel};
use serde::de::DeserializeOwned;

pub use qrgen_infra::ErrorResponse;

/// Wrapper so `IntoResponse` can be implemented for `CodeError`.
/// `message` replaces the client message when an endpoint has a fixed wording.
#[derive(Debug)]
pub struct HttpAppError {
    pub error: CodeError,
    message: Option<String>,
}

impl HttpAppError {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<CodeError> for HttpAppError {
    fn from(error: CodeError) -> Self {
        HttpAppError {
            error,
            message: None,
        }
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError::from(CodeError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON extractor that answers malformed bodies with our 400 error shape
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &CodeError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_error(&self.error);

        let mut body =
            ErrorResponse::new(self.message.unwrap_or_else(|| self.error.client_message()));
        // Details only for non-sensitive errors outside production
        if !is_production_env() && !self.error.is_sensitive() {
            body.details = Some(self.error.to_string());
            body.error_type = Some(self.error.error_type().to_string());
        }

        (status, Json(body)).into_response()
    }
}
