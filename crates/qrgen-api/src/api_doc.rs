//! OpenAPI documentation, served as JSON at [`crate::constants::OPENAPI_PATH`].

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "qrgen API",
        description = "Generates QR codes and linear barcodes as PNG data URLs."
    ),
    paths(handlers::generate::generate, handlers::health::health_check),
    components(schemas(
        ErrorResponse,
        handlers::generate::GenerateRequest,
        handlers::generate::GenerateResponse,
        handlers::health::HealthResponse
    )),
    tags(
        (name = "generate", description = "Code generation"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.version = crate::constants::API_VERSION.to_string();
    spec
}
