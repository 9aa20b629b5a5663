use std::sync::Arc;

use axum::{extract::State, Json};
use qrgen_core::{CodeError, Symbology};
use qrgen_services::GenerationState;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{NO_URL_MESSAGE, QR_FAILED_MESSAGE};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Text or URL to encode
    #[serde(default)]
    pub url: Option<String>,
    /// Symbology name, e.g. `qrcode`, `CODE128`, `EAN13`. Defaults to QR.
    #[serde(default, rename = "type")]
    pub symbology: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    /// PNG data URL. The key stays `qr` for every symbology.
    pub qr: String,
}

#[utoipa::path(
    post,
    path = "/generate",
    tag = "generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Code generated", body = GenerateResponse),
        (status = 400, description = "Missing URL or input invalid for the format", body = ErrorResponse),
        (status = 500, description = "Encoder failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "generate"))]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, HttpAppError> {
    let text = match request.url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => return Err(HttpAppError::from(CodeError::EmptyInput).with_message(NO_URL_MESSAGE)),
    };

    let symbology = match request.symbology.as_deref() {
        Some(name) if !name.trim().is_empty() => name.parse::<Symbology>()?,
        _ => Symbology::Qr,
    };

    match state.workflow().generate(text, symbology).await {
        GenerationState::Succeeded(code) => Ok(Json(GenerateResponse {
            qr: code.image_data,
        })),
        GenerationState::Failed { error, .. } => Err(into_http_error(error, symbology)),
        other => Err(CodeError::Internal(format!("generation ended in {:?}", other)).into()),
    }
}

fn into_http_error(error: CodeError, symbology: Symbology) -> HttpAppError {
    match error {
        CodeError::EmptyInput => HttpAppError::from(error).with_message(NO_URL_MESSAGE),
        CodeError::Render { .. } if symbology.is_qr() => {
            HttpAppError::from(error).with_message(QR_FAILED_MESSAGE)
        }
        other => other.into(),
    }
}
